//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent values the tree model cannot accept.
///
/// Expected outcomes of tree operations (duplicates, search misses) are
/// never reported through this type; they are part of the operation results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid key: {0} is not a finite number")]
    InvalidKey(String),

    #[error("invalid viewport '{0}': expected WIDTHxHEIGHT")]
    InvalidViewport(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
