use thiserror::Error;

use boxrev_warehouse::WarehouseError;

use crate::omdb::TransportError;

/// Top-level error type for pipeline operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The OMDb API key is absent or empty. Raised before any I/O.
    #[error("OMDB API key not defined")]
    MissingApiKey,

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CoreError {
    /// Configuration errors fail fast, before any network or store I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey | Self::Warehouse(WarehouseError::NoSuchColumn { .. })
        )
    }
}
