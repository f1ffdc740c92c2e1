//! Idempotent schema bootstrap.
//!
//! Creates tables and `modified_date` triggers for an ordered list of
//! [`TableDef`]s. Creation is per-statement, not transactional across
//! tables: the first store error aborts the remaining bootstrap and
//! surfaces to the caller.

use tracing::info;

use crate::schema::TableDef;
use crate::{Warehouse, WarehouseError};

impl Warehouse {
    /// Ensure every table (and, for audited tables, its trigger) exists.
    ///
    /// Tables are created with `IF NOT EXISTS` and never altered when
    /// already present. Order matters: tables with foreign keys must be
    /// listed after the tables they reference. Running this twice on the
    /// same list is a no-op.
    pub fn ensure_schema(&self, tables: &[TableDef]) -> Result<(), WarehouseError> {
        for def in tables {
            self.connection().execute_batch(&def.create_sql())?;
            let mut note = format!("if not existed, table '{}' created", def.name);

            if def.audited && !self.trigger_exists(&def.trigger_name())? {
                self.connection().execute_batch(&def.trigger_sql())?;
                note.push_str(" + modified_date trigger");
            }
            info!("{note}");
        }
        Ok(())
    }

    fn trigger_exists(&self, name: &str) -> Result<bool, WarehouseError> {
        let mut stmt = self
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'trigger' AND name = ?1")?;
        Ok(stmt.exists([name])?)
    }
}
