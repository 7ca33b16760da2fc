//! Error types for update task validation and hook invocation parsing.

use thiserror::Error;

/// Errors returned while constructing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateTaskDomainError {
    /// The correlation identifier is empty or whitespace-only.
    #[error("correlation identifier must not be empty")]
    EmptyCorrelationId,

    /// The ref name is empty.
    #[error("ref name must not be empty")]
    EmptyRefName,

    /// The commit identifier is not a hexadecimal object id.
    #[error("invalid commit id '{0}', expected 40 or 64 hexadecimal characters")]
    InvalidCommitId(String),
}

/// Errors that make a hook invocation malformed.
///
/// All variants are fatal: git must see a non-zero exit so that it rejects
/// the ref update instead of silently dropping it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The hook was not given exactly three positional arguments.
    #[error("expected 3 arguments (ref name, old commit id, new commit id), received {actual}")]
    ArgumentCount {
        /// Number of positional arguments received.
        actual: usize,
    },

    /// The interactive-push marker is set but no correlation identifier was
    /// supplied by the calling environment.
    #[error("interactive push without a correlation identifier in {variable}")]
    MissingCorrelationId {
        /// Environment variable that should carry the identifier.
        variable: &'static str,
    },

    /// One of the positional arguments failed validation.
    #[error(transparent)]
    Invalid(#[from] UpdateTaskDomainError),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown update task status: {0}")]
pub struct ParseUpdateTaskStatusError(pub String);
