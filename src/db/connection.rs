//! Database connection management.

use crate::db::value::{Record, Value};
use crate::error::{Error, Result};
use rusqlite::{Connection as SqliteConnection, ToSql, Transaction};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the database location.
pub const DB_ENV_VAR: &str = "TODO_DB";

/// Path to the to-do database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPath {
    path: PathBuf,
}

impl DbPath {
    /// Create a new DbPath with the default filename "todo.sqlite3".
    pub fn default_path() -> Self {
        Self {
            path: PathBuf::from("todo.sqlite3"),
        }
    }

    /// Create a DbPath from a string path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Resolve the path from `TODO_DB`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var_os(DB_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default_path(),
        }
    }

    /// Get the path as a reference.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Check if the database file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for DbPath {
    fn default() -> Self {
        Self::default_path()
    }
}

impl AsRef<Path> for DbPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Database connection wrapper.
///
/// Statements run in autocommit mode. The handle is single-owner: share it
/// across threads only behind a caller-held lock.
pub struct Connection {
    conn: Option<SqliteConnection>,
}

impl Connection {
    /// Open or create the database file at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = SqliteConnection::open(path).map_err(|e| Error::storage(path, e))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| Error::storage(path, e))?;
        // Reading the catalog rejects files that exist but are not databases.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| Error::storage(path, e))?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn: Some(conn) })
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = SqliteConnection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn: Some(conn) })
    }

    /// Release the handle. Closing an already closed connection is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| Error::from(e))?;
            debug!("closed database");
        }
        Ok(())
    }

    /// True once [`Connection::close`] has released the handle.
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Get a reference to the underlying SqliteConnection.
    pub fn as_conn(&self) -> Result<&SqliteConnection> {
        self.conn.as_ref().ok_or(Error::Closed)
    }

    /// Execute a parameterized statement and collect every result row.
    ///
    /// Statements that produce no rows (inserts, updates, DDL) return an empty vector.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Record>> {
        let conn = self.as_conn()?;
        debug!(sql, "execute");
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();

        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::with_capacity(columns.len());
            for (idx, (name, decl_type)) in columns.iter().enumerate() {
                let value = Value::from_sql(row.get_ref(idx)?, decl_type.as_deref());
                record.push(name.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Execute a data-modifying statement and return the number of rows affected.
    pub fn update(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        debug!(sql, "update");
        self.as_conn()?.execute(sql, params).map_err(Error::from)
    }

    /// Execute several semicolon separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.as_conn()?.execute_batch(sql).map_err(Error::from)
    }

    /// Query a single row.
    pub fn query_row<T, F>(&self, sql: &str, params: &[&dyn ToSql], f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Row) -> rusqlite::Result<T>,
    {
        self.as_conn()?
            .query_row(sql, params, f)
            .map_err(Error::from)
    }

    /// Query multiple rows.
    pub fn query<T, F>(&self, sql: &str, params: &[&dyn ToSql], f: F) -> Result<Vec<T>>
    where
        F: FnMut(&rusqlite::Row) -> rusqlite::Result<T>,
    {
        let mut stmt = self.as_conn()?.prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Begin a transaction; dropping it without commit rolls back.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        self.as_conn()?
            .unchecked_transaction()
            .map_err(Error::from)
    }

    /// Check if a table exists.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut stmt = self
            .as_conn()?
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?")?;
        Ok(stmt.exists([table_name])?)
    }

    /// Get the last inserted row id.
    pub fn last_insert_rowid(&self) -> Result<i64> {
        Ok(self.as_conn()?.last_insert_rowid())
    }
}
