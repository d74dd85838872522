//! Errors raised by the tabular stores.

use thiserror::Error;

/// Failure of a local workbook or mirror operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document '{0}' not found")]
    DocumentNotFound(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Document '{0}' already exists")]
    AlreadyExists(String),

    /// The mirror could not be reached at all
    #[error("Mirror unreachable: {0}")]
    Unreachable(String),

    #[error("Row {row} is out of range for sheet '{sheet}'")]
    RowOutOfRange { sheet: String, row: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl StoreError {
    /// True for failures caused by the mirror being offline
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Unreachable(_))
    }

    /// True for a missing document or sheet
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::DocumentNotFound(_) | StoreError::SheetNotFound(_)
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
