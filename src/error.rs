//! Error types for the record registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Record registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Record {id} already exists")]
    DuplicateKey { id: i64 },

    #[error("Record {key} not found")]
    NotFound { key: String },

    #[error("Registry is empty")]
    EmptyContainer,

    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{kind} {from}-{to} already exists")]
    DuplicateLink {
        kind: &'static str,
        from: i64,
        to: i64,
    },

    #[error("Course {id} is not open for enrollment")]
    CourseUnavailable { id: i64 },

    #[error("Unknown {kind} {id}")]
    UnknownReference { kind: &'static str, id: i64 },

    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl RegistryError {
    /// Not-found error for an id
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { key: id.to_string() }
    }
}
