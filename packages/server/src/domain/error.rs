//! Domain-level error types.

use thiserror::Error;

/// Value-object validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{0} has an invalid format")]
    InvalidFormat(&'static str),
}

/// Failures reported by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("message '{0}' not found")]
    NotFound(String),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Handshake failures. Every variant is fatal to the connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingToken,
    #[error("malformed credential")]
    MalformedToken,
    #[error("invalid credential signature")]
    InvalidSignature,
    #[error("credential expired")]
    Expired,
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
}

/// Delivery failures towards a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ClientNotFound(String),
    #[error("push failed: {0}")]
    PushFailed(String),
}
