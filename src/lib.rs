//! # todo-store - persistence for a personal to-do list
//!
//! Two tables in a single SQLite file: `TodoPriority`, seeded with
//! Low/Medium/High on first use, and `TodoTask`, whose `priority` column is a
//! foreign key into it. Tables create themselves when first bound to a
//! [`Connection`], so opening the same file again is a no-op.
//!
//! ```no_run
//! use todo_store::{Connection, NewTask, PriorityTable, Table, TaskTable};
//!
//! # fn main() -> todo_store::Result<()> {
//! let conn = Connection::open("todo.sqlite3")?;
//! let _priorities = PriorityTable::new(&conn)?;
//! let tasks = TaskTable::new(&conn)?;
//! let id = tasks.insert(&NewTask::new("Renew passport").priority(3))?;
//! assert_eq!(tasks.get(id)?.map(|t| t.name).as_deref(), Some("Renew passport"));
//! assert_eq!(tasks.count()?, 1);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use crate::core::{NewTask, Priority, PriorityTable, Table, Task, TaskTable};
pub use error::{Error, Result};

pub use db::{Connection, DbPath, Record, Value};
