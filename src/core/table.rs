//! Behaviour shared by every concrete table.

use crate::db::schema::TableSchema;
use crate::db::Connection;
use crate::error::Result;
use std::collections::BTreeSet;

/// A table bound to an open connection.
///
/// Implementors create their table (and seed rows) in their constructor via
/// [`TableSchema::ensure`], so holding a value means the table exists.
pub trait Table {
    /// Static description of the table.
    fn schema(&self) -> &'static TableSchema;

    /// Connection the table was opened on.
    fn connection(&self) -> &Connection;

    /// Stored table name.
    fn name(&self) -> &'static str {
        self.schema().name
    }

    /// Canonical `create table` statement.
    fn create_sql(&self) -> String {
        self.schema().create_sql()
    }

    /// Names of the table's secondary indices.
    fn indices(&self) -> BTreeSet<&'static str> {
        self.schema().indices.iter().map(|index| index.name).collect()
    }

    /// Current number of rows.
    fn count(&self) -> Result<i64> {
        let sql = format!("select count(*) from {}", self.name());
        self.connection().query_row(&sql, &[], |row| row.get(0))
    }
}
