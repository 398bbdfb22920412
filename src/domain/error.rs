//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the descriptor model or the graph contract.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A scalar field value does not match its required pattern.
    /// The rejected write leaves the prior value in place.
    #[error("invalid value {value:?} for {field}: expected {expected}")]
    Validation {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// A structural call addressed an empty sequence or a non-live parent index.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A raw link references a group tag that no node carries.
    #[error("unresolved group tag {0}: no node carries this group")]
    UnresolvedGroup(i64),

    #[error("invalid field path: {0}")]
    InvalidPath(String),
}

impl DomainError {
    pub(crate) fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// True for rejected field writes, which collaborators surface as a status
    /// rather than a failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
