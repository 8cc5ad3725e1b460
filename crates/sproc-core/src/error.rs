//! Error types for SPROC

use thiserror::Error;

/// Failures raised while declaring parameters, before anything is executed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("parameter {0} is NULL and has no explicit type")]
    UntypedNull(String),

    #[error("parameter {parameter}: type {type_name} cannot be bound")]
    UnsupportedType {
        parameter: String,
        type_name: String,
    },

    #[error("parameter {parameter}: value of type {actual} does not match declared type {expected}")]
    TypeMismatch {
        parameter: String,
        expected: String,
        actual: String,
    },

    #[error("parameter {0} is already declared")]
    DuplicateName(String),

    #[error("a return value parameter is already declared")]
    DuplicateReturnValue,

    #[error("parameter name must not be empty")]
    EmptyName,

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter {0} is input-only and has no output value")]
    NotAnOutput(String),
}

/// Core error type for SPROC operations
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    #[error("Sequence contains no element")]
    EmptySequence,

    #[error("Sequence contains more than one element")]
    MultipleElements,

    #[error("{parameter} is null and can't be assigned to a non-nullable type")]
    NullCoercion { parameter: String },

    #[error("Cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column ordinal {ordinal} is out of range ({count} columns)")]
    OrdinalOutOfRange { ordinal: usize, count: usize },

    #[error("Cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("Output parameter {0} was read before execution completed")]
    NotExecuted(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProcError {
    /// Whether the error came from an observed cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcError::Cancelled)
    }
}

/// Result type alias for SPROC operations
pub type Result<T> = std::result::Result<T, ProcError>;
