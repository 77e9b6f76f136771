//! Priority reference table.

use crate::core::table::Table;
use crate::db::schema::{Column, DefaultExpr, Seed, SeedValue, SqlType, TableSchema};
use crate::db::Connection;
use crate::error::Result;
use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const LOW: i64 = 1;
pub const MEDIUM: i64 = 2;
pub const HIGH: i64 = 3;

/// `TodoPriority` schema, seeded with Low/Medium/High.
pub const PRIORITY_SCHEMA: TableSchema = TableSchema {
    name: "TodoPriority",
    columns: &[
        Column::new("code", SqlType::Integer).primary_key().not_null(),
        Column::new("name", SqlType::Text).not_null(),
        Column::new("created", SqlType::Timestamp).default(DefaultExpr::LocalNow),
    ],
    indices: &[],
    seed: Some(Seed {
        columns: &["code", "name"],
        rows: &[
            &[SeedValue::Integer(LOW), SeedValue::Text("Low")],
            &[SeedValue::Integer(MEDIUM), SeedValue::Text("Medium")],
            &[SeedValue::Integer(HIGH), SeedValue::Text("High")],
        ],
    }),
};

/// A priority row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub code: i64,
    pub name: String,
    pub created: Option<NaiveDateTime>,
}

impl Priority {
    /// Create a Priority from a SQLite row.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            created: row.get("created")?,
        })
    }
}

/// Handle on the `TodoPriority` table.
pub struct PriorityTable<'c> {
    conn: &'c Connection,
}

impl<'c> PriorityTable<'c> {
    /// Bind to `conn`, creating and seeding the table on first use.
    pub fn new(conn: &'c Connection) -> Result<Self> {
        PRIORITY_SCHEMA.ensure(conn)?;
        Ok(Self { conn })
    }

    /// Priority with the given code, if any.
    pub fn get(&self, code: i64) -> Result<Option<Priority>> {
        let rows = self.conn.query(
            "select * from TodoPriority where code = ?",
            &[&code],
            Priority::from_row,
        )?;
        Ok(rows.into_iter().next())
    }

    /// All priorities ordered by code.
    pub fn all(&self) -> Result<Vec<Priority>> {
        self.conn.query(
            "select * from TodoPriority order by code",
            &[],
            Priority::from_row,
        )
    }

    /// Add a priority. A duplicate code is an integrity violation.
    pub fn insert(&self, code: i64, name: &str) -> Result<()> {
        self.conn.update(
            "insert into TodoPriority(code, name) values(?, ?)",
            &[&code, &name],
        )?;
        Ok(())
    }

    /// Remove a priority. Fails with an integrity violation while tasks reference it.
    pub fn delete(&self, code: i64) -> Result<bool> {
        let deleted = self
            .conn
            .update("delete from TodoPriority where code = ?", &[&code])?;
        Ok(deleted > 0)
    }
}

impl Table for PriorityTable<'_> {
    fn schema(&self) -> &'static TableSchema {
        &PRIORITY_SCHEMA
    }

    fn connection(&self) -> &Connection {
        self.conn
    }
}
