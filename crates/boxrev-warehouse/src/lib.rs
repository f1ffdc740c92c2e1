//! # boxrev-warehouse
//!
//! SQLite-backed staging store and star-schema warehouse for the boxrev
//! pipeline.
//!
//! The crate covers four concerns:
//!
//! - a declarative [`schema`] registry describing every staging and warehouse
//!   table plus its `modified_date` trigger,
//! - an idempotent schema [`bootstrap`](Warehouse::ensure_schema),
//! - the [`ingest`] engine (CSV merges and the movie-details bulk upsert),
//! - the SQL [`scripts`] runner and the [`dashboard`] query/render layer.
//!
//! All access goes through short-lived units of work on a single
//! [`Warehouse`] handle: each operation opens a transaction and commits or
//! rolls back on every exit path. The pipeline is batch oriented and assumes
//! a single writer; locking is delegated to SQLite.

pub mod bootstrap;
pub mod dashboard;
pub mod ingest;
pub mod schema;
pub mod scripts;

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Number, Value};
use thiserror::Error;

pub use dashboard::{plot_details, selection_keys, write_html, PlotDetails};
pub use ingest::{CsvIngestDefinition, MovieDetailsEntry};
pub use schema::{ColumnDef, TableDef, STAGING_TABLES, WAREHOUSE_TABLES};
pub use scripts::ScriptKind;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("script not found: {}", path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("table '{table}' has no column '{column}'")]
    NoSuchColumn { table: String, column: String },

    #[error("CSV {} is missing required column '{column}'", path.display())]
    MissingCsvColumn { path: PathBuf, column: String },

    #[error("CSV row {row} has {found} fields, expected {expected}")]
    CsvRowShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown dashboard selection '{0}'")]
    UnknownSelection(String),
}

/// Handle to the staging + warehouse database.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WarehouseError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc SQL and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Row count of an arbitrary table. Mostly useful for progress reporting
    /// and tests; not part of the pipeline proper.
    pub fn count_rows(&self, table: &str) -> Result<i64, WarehouseError> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Execute a read-only query and return all rows as JSON values, one
    /// array per row. Used by the dashboard layer.
    pub fn query_json(&self, sql: &str) -> Result<(Vec<String>, Vec<Vec<Value>>), WarehouseError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                values.push(json_value(row.get_ref(index)?));
            }
            rows.push(values);
        }
        Ok((columns, rows))
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Number(n.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::String(String::from_utf8_lossy(blob).into_owned()),
    }
}
