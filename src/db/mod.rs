//! Database layer for the to-do store.
//!
//! Handles the SQLite connection, dynamically typed records and table schemas.

mod connection;
pub mod schema;
mod value;

pub use connection::{Connection, DbPath, DB_ENV_VAR};
pub use schema::{Column, DefaultExpr, ForeignKey, Index, Seed, SeedValue, SqlType, TableSchema};
pub use value::{Record, Value};
