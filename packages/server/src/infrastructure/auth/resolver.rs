//! Token → Identity resolution for the connection handshake.

use std::sync::Arc;

use async_trait::async_trait;
use cohort_chat_shared::time::Clock;

use crate::domain::{AuthError, Identity, IdentityDirectory, IdentityResolver, UserId};

use super::HmacTokenCodec;

/// Verifies a signed credential and looks its subject up in the directory.
pub struct TokenIdentityResolver {
    codec: HmacTokenCodec,
    directory: Arc<dyn IdentityDirectory>,
    clock: Arc<dyn Clock>,
}

impl TokenIdentityResolver {
    pub fn new(
        codec: HmacTokenCodec,
        directory: Arc<dyn IdentityDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            directory,
            clock,
        }
    }
}

#[async_trait]
impl IdentityResolver for TokenIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.verify(token, self.clock.now_secs())?;
        let user_id = UserId::new(claims.sub.clone())
            .map_err(|_| AuthError::UnknownSubject(claims.sub.clone()))?;
        self.directory
            .find(&user_id)
            .await
            .ok_or(AuthError::UnknownSubject(claims.sub))
    }
}
