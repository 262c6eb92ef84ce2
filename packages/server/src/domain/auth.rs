//! Connection-time authentication port.

use async_trait::async_trait;

use super::{AuthError, Identity};

/// Resolves a handshake credential into an identity.
///
/// Implementations share the trust root of the stateless HTTP API. Any
/// failure must be reported as an [`AuthError`]; callers refuse the
/// connection on error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}
