//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree's rules.
/// These are independent of persistence and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown node id: {0}")]
    UnknownNodeId(String),

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("value rejected for {id}: {reason}")]
    ValueRejected { id: String, reason: String },

    #[error("invariant violated at {id}: {reason}")]
    InvariantViolation { id: String, reason: String },
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            reason: reason.into(),
        }
    }

    pub fn rejected(id: &str, reason: impl Into<String>) -> Self {
        Self::ValueRejected {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
