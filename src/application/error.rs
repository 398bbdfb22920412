//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    /// A script line that is not a valid edit command.
    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    /// A well-formed script line rejected by the descriptor tree.
    #[error("script line {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: DomainError,
    },

    #[error("invalid document {context}: {source}")]
    Document {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
