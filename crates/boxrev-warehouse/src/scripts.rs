//! File-driven SQL execution: view creation and staging → warehouse
//! transformation scripts.
//!
//! A script is one unit of work: its full text runs as a single batch inside
//! one transaction with foreign-key enforcement on, and any execution error
//! rolls the whole script back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{Warehouse, WarehouseError};

/// The two fixed script directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Aggregate view definitions consumed by the dashboard layer.
    Views,
    /// Staging → warehouse population scripts.
    Transformations,
}

impl ScriptKind {
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Transformations => "transformations",
        }
    }

    pub fn dir(self, sql_dir: &Path) -> PathBuf {
        sql_dir.join(self.subdir())
    }
}

impl Warehouse {
    /// Execute one SQL script from the directory for `kind`.
    ///
    /// A missing file surfaces as [`WarehouseError::ScriptNotFound`]; any
    /// execution error rolls back and propagates. No partial application.
    pub fn run_script(
        &self,
        sql_dir: &Path,
        kind: ScriptKind,
        filename: &str,
    ) -> Result<(), WarehouseError> {
        let path = kind.dir(sql_dir).join(filename);
        let sql = fs::read_to_string(&path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                WarehouseError::ScriptNotFound { path: path.clone() }
            } else {
                WarehouseError::Io(error)
            }
        })?;

        self.connection().pragma_update(None, "foreign_keys", true)?;
        let tx = self.connection().unchecked_transaction()?;
        match tx.execute_batch(&sql) {
            Ok(()) => tx.commit()?,
            Err(error) => {
                tx.rollback()?;
                return Err(error.into());
            }
        }
        info!(script = %path.display(), "SQL script applied");
        Ok(())
    }

    /// Execute every `*.sql` script for `kind` in lexical filename order.
    /// Returns the filenames that ran.
    pub fn run_all_scripts(
        &self,
        sql_dir: &Path,
        kind: ScriptKind,
    ) -> Result<Vec<String>, WarehouseError> {
        let dir = kind.dir(sql_dir);
        let mut names: Vec<String> = fs::read_dir(&dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.ends_with(".sql").then_some(name)
            })
            .collect();
        names.sort();

        for name in &names {
            self.run_script(sql_dir, kind, name)?;
        }
        Ok(names)
    }
}
