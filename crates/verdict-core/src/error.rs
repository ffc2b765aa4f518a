//! Error types for verdict

/// Result type alias using verdict's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for verdict operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pattern extracted a token that is not a known label surface form.
    /// This always points at a catalog defect.
    #[error("unrecognized label token: {0:?}")]
    UnrecognizedLabelToken(String),

    /// Pattern catalog construction errors
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Inconsistent input data (prompt mismatch, missing column, ...)
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote completion provider errors
    #[error("provider error: {0}")]
    Provider(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new unrecognized label token error
    pub fn unrecognized_label(token: impl Into<String>) -> Self {
        Self::UnrecognizedLabelToken(token.into())
    }

    /// Create a new catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a new data integrity error
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
