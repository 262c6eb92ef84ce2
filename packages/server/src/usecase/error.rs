//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{AuthError, DomainError, RepositoryError};

/// Failure of a chat action.
///
/// Every variant except `Authentication` is recoverable: it is reported to
/// the acting connection only and leaves the connection open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Bad, missing or expired credential at handshake.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    /// Insufficient role or cohort access.
    #[error("forbidden: {0}")]
    Authorization(String),
    /// Empty content, malformed ids or payload.
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The store rejected or failed the write; nothing was broadcast.
    #[error("persistence failure: {0}")]
    Persistence(RepositoryError),
}

impl ChatError {
    /// Error code sent to the client in the `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Authentication(_) => "UNAUTHORIZED",
            ChatError::Authorization(_) => "FORBIDDEN",
            ChatError::Validation(_) => "VALIDATION",
            ChatError::NotFound(_) => "NOT_FOUND",
            ChatError::Persistence(_) => "PERSISTENCE",
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ChatError::Authorization(reason.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        ChatError::Validation(reason.into())
    }
}

impl From<DomainError> for ChatError {
    fn from(error: DomainError) -> Self {
        ChatError::Validation(error.to_string())
    }
}

impl From<RepositoryError> for ChatError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(id) => ChatError::NotFound(format!("message '{id}'")),
            other => ChatError::Persistence(other),
        }
    }
}
