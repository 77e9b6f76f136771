//! Table schemas as data, their `create table` rendering, and idempotent creation.

use crate::db::Connection;
use crate::error::Result;
use rusqlite::types::{ToSql, ToSqlOutput};
use tracing::{debug, info};

/// Declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Date,
    Timestamp,
}

impl SqlType {
    /// SQL spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::Real => "real",
            SqlType::Text => "text",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
        }
    }
}

/// Column default expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultExpr {
    Integer(i64),
    Text(&'static str),
    /// Row insertion time in the local time zone.
    LocalNow,
    /// Insertion date in the local time zone.
    LocalToday,
}

impl DefaultExpr {
    fn render(&self) -> String {
        match self {
            DefaultExpr::Integer(i) => i.to_string(),
            DefaultExpr::Text(s) => format!("'{}'", s.replace('\'', "''")),
            DefaultExpr::LocalNow => "(datetime('now', 'localtime'))".to_string(),
            DefaultExpr::LocalToday => "(date('now', 'localtime'))".to_string(),
        }
    }
}

/// Foreign key target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

/// One column and its constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub not_null: bool,
    pub references: Option<ForeignKey>,
    pub default: Option<DefaultExpr>,
}

impl Column {
    /// Nullable column without constraints.
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            autoincrement: false,
            not_null: false,
            references: None,
            default: None,
        }
    }

    /// Mark as primary key.
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as autoincrement.
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Mark as not null.
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Add a foreign key to `table(column)`.
    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    /// Set the default expression.
    pub const fn default(mut self, default: DefaultExpr) -> Self {
        self.default = Some(default);
        self
    }

    /// Column clause in the fixed order: type, primary key, autoincrement,
    /// not null, references, default.
    pub fn render(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type.as_str());
        if self.primary_key {
            sql.push_str(" primary key");
        }
        if self.autoincrement {
            sql.push_str(" autoincrement");
        }
        if self.not_null {
            sql.push_str(" not null");
        }
        if let Some(fk) = &self.references {
            sql.push_str(&format!(" references {}({})", fk.table, fk.column));
        }
        if let Some(default) = &self.default {
            sql.push_str(&format!(" default {}", default.render()));
        }
        sql
    }
}

/// Secondary index over one or more columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Literal used in seed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedValue {
    Integer(i64),
    Text(&'static str),
}

impl ToSql for SeedValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SeedValue::Integer(i) => i.to_sql(),
            SeedValue::Text(s) => s.to_sql(),
        }
    }
}

/// Rows written once, in the same transaction that creates the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub columns: &'static [&'static str],
    pub rows: &'static [&'static [SeedValue]],
}

/// Complete description of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [Index],
    pub seed: Option<Seed>,
}

impl TableSchema {
    /// Render the `create table` statement. Pure and deterministic.
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\t{}", c.render()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("create table {}(\n{}\n);", self.name, columns)
    }

    /// Render the statement for one of this table's indices.
    pub fn index_sql(&self, index: &Index) -> String {
        format!(
            "create index if not exists {table}_{name} on {table}({columns});",
            table = self.name,
            name = index.name,
            columns = index.columns.join(", ")
        )
    }

    fn seed_sql(&self, seed: &Seed) -> String {
        format!(
            "insert into {}({}) values({})",
            self.name,
            seed.columns.join(", "),
            vec!["?"; seed.columns.len()].join(", ")
        )
    }

    /// Create the table, its indices and seed rows unless the table already exists.
    ///
    /// Returns `true` when the table was created. Check-then-create assumes a single
    /// writer; two processes initialising the same new file at once may race.
    pub fn ensure(&self, conn: &Connection) -> Result<bool> {
        if conn.table_exists(self.name)? {
            debug!(table = self.name, "table already exists");
            return Ok(false);
        }

        let tx = conn.transaction()?;
        tx.execute_batch(&self.create_sql())?;
        for index in self.indices {
            tx.execute_batch(&self.index_sql(index))?;
        }
        let mut seeded = 0;
        if let Some(seed) = &self.seed {
            let mut stmt = tx.prepare(&self.seed_sql(seed))?;
            for row in seed.rows {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
                seeded += 1;
            }
        }
        tx.commit()?;

        info!(table = self.name, seeded, "created table");
        Ok(true)
    }
}
