//! SQL Server adapter errors

use sproc_core::{ProcError, StorageType};

/// Errors raised while talking to SQL Server through tiberius
#[derive(Debug, thiserror::Error)]
pub enum MssqlError {
    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Parameter {parameter} cannot be sent as {storage:?}: {reason}")]
    InvalidParameter {
        parameter: String,
        storage: StorageType,
        reason: String,
    },
}

impl From<MssqlError> for ProcError {
    fn from(err: MssqlError) -> Self {
        match err {
            MssqlError::Tiberius(e) => ProcError::Transport(e.to_string()),
            other => ProcError::Conversion(other.to_string()),
        }
    }
}
