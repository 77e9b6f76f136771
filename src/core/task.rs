//! Task table and typed task rows.

use crate::core::priority::{MEDIUM, PRIORITY_SCHEMA};
use crate::core::table::Table;
use crate::db::schema::{Column, DefaultExpr, Index, SqlType, TableSchema};
use crate::db::{Connection, Value};
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};

/// Status of a task nobody has finished yet.
pub const STATUS_OPEN: i64 = 0;

/// Conventional "done" status. Any nonzero value counts as closed; the
/// application owns the rest of the enumeration.
pub const STATUS_DONE: i64 = 2;

/// `TodoTask` schema.
pub const TASK_SCHEMA: TableSchema = TableSchema {
    name: "TodoTask",
    columns: &[
        Column::new("id", SqlType::Integer)
            .primary_key()
            .autoincrement()
            .not_null(),
        Column::new("name", SqlType::Text).not_null(),
        Column::new("priority", SqlType::Integer)
            .references(PRIORITY_SCHEMA.name, "code")
            .default(DefaultExpr::Integer(MEDIUM)),
        Column::new("deadline", SqlType::Date)
            .not_null()
            .default(DefaultExpr::LocalToday),
        Column::new("status", SqlType::Integer).default(DefaultExpr::Integer(STATUS_OPEN)),
        Column::new("completed", SqlType::Timestamp),
        Column::new("created", SqlType::Timestamp).default(DefaultExpr::LocalNow),
    ],
    indices: &[Index {
        name: "status",
        columns: &["status"],
    }],
    seed: None,
};

/// A task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub priority: Option<i64>,
    pub deadline: NaiveDate,
    pub status: i64,
    pub completed: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
}

impl Task {
    /// Create a Task from a SQLite row.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            priority: row.get("priority")?,
            deadline: row.get("deadline")?,
            status: row.get::<_, Option<i64>>("status")?.unwrap_or(STATUS_OPEN),
            completed: row.get("completed")?,
            created: row.get("created")?,
        })
    }

    /// True while the status is [`STATUS_OPEN`].
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}

/// Fields supplied by the caller when adding a task. Omitted fields take
/// the column defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    name: String,
    priority: Option<i64>,
    deadline: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            deadline: None,
        }
    }

    pub fn priority(mut self, code: i64) -> Self {
        self.priority = Some(code);
        self
    }

    pub fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Handle on the `TodoTask` table.
pub struct TaskTable<'c> {
    conn: &'c Connection,
}

impl<'c> TaskTable<'c> {
    /// Bind to `conn`, creating the priority table it references and then
    /// the task table and its index on first use.
    pub fn new(conn: &'c Connection) -> Result<Self> {
        PRIORITY_SCHEMA.ensure(conn)?;
        TASK_SCHEMA.ensure(conn)?;
        Ok(Self { conn })
    }

    /// Insert a task and return its id. An unknown priority is an integrity
    /// violation and writes nothing.
    pub fn insert(&self, task: &NewTask) -> Result<i64> {
        let mut columns = vec!["name"];
        let mut values = vec![Value::from(task.name.as_str())];
        if let Some(priority) = task.priority {
            columns.push("priority");
            values.push(Value::from(priority));
        }
        if let Some(deadline) = task.deadline {
            columns.push("deadline");
            values.push(Value::from(deadline));
        }

        let sql = format!(
            "insert into {}({}) values({})",
            TASK_SCHEMA.name,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
        self.conn.update(&sql, &params)?;
        self.conn.last_insert_rowid()
    }

    /// Task with the given id, if any.
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let rows = self
            .conn
            .query("select * from TodoTask where id = ?", &[&id], Task::from_row)?;
        Ok(rows.into_iter().next())
    }

    /// All tasks in insertion order.
    ///
    /// Typed rows need `deadline` in `YYYY-MM-DD` form. A row written through
    /// [`Connection::execute`] with any other text fails the whole call with
    /// [`Error::Db`]; read such rows through `execute` instead.
    pub fn all(&self) -> Result<Vec<Task>> {
        self.conn
            .query("select * from TodoTask order by id", &[], Task::from_row)
    }

    /// Tasks with the given status, served by the status index. Same date
    /// requirement as [`TaskTable::all`].
    pub fn with_status(&self, status: i64) -> Result<Vec<Task>> {
        self.conn.query(
            "select * from TodoTask where status = ? order by id",
            &[&status],
            Task::from_row,
        )
    }

    /// Close a task with a nonzero status, stamping `completed` with the local
    /// time unless it is already set.
    pub fn mark_done(&self, id: i64, status: i64) -> Result<Task> {
        if status == STATUS_OPEN {
            return Err(Error::InvalidStatus(status));
        }
        let changed = self.conn.update(
            "update TodoTask set status = ?, \
             completed = coalesce(completed, datetime('now', 'localtime')) \
             where id = ?",
            &[&status, &id],
        )?;
        self.reload(id, changed)
    }

    /// Put a task back to open and clear its completion time.
    pub fn reopen(&self, id: i64) -> Result<Task> {
        let changed = self.conn.update(
            "update TodoTask set status = ?, completed = null where id = ?",
            &[&STATUS_OPEN, &id],
        )?;
        self.reload(id, changed)
    }

    /// Remove a task, returning whether it existed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .update("delete from TodoTask where id = ?", &[&id])?;
        Ok(deleted > 0)
    }

    fn reload(&self, id: i64, changed: usize) -> Result<Task> {
        if changed == 0 {
            return Err(Error::TaskNotFound(id));
        }
        self.get(id)?.ok_or(Error::TaskNotFound(id))
    }
}

impl Table for TaskTable<'_> {
    fn schema(&self) -> &'static TableSchema {
        &TASK_SCHEMA
    }

    fn connection(&self) -> &Connection {
        self.conn
    }
}
