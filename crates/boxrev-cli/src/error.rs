use thiserror::Error;

use boxrev_core::{CoreError, WarehouseError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("command error: {0}")]
    Command(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(error) if error.is_configuration() => 2,
            Self::Warehouse(WarehouseError::ScriptNotFound { .. }) => 3,
            Self::Warehouse(WarehouseError::UnknownSelection(_)) => 3,
            Self::Command(_) => 4,
            _ => 10,
        }
    }
}
