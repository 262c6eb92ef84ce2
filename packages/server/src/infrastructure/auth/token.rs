//! HMAC-SHA256 signed credentials.
//!
//! Format: `base64url(claims_json) "." base64url(hmac_sha256(secret, first_segment))`,
//! unpadded. The same secret verifies tokens for the HTTP API and for the
//! WebSocket handshake.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Error)]
#[error("token secret must not be empty")]
pub struct InvalidTokenSecret;

#[derive(Clone)]
pub struct HmacTokenCodec {
    mac: HmacSha256,
}

impl HmacTokenCodec {
    pub fn new(secret: &[u8]) -> Result<Self, InvalidTokenSecret> {
        if secret.is_empty() {
            return Err(InvalidTokenSecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| InvalidTokenSecret)?;
        Ok(Self { mac })
    }

    /// Mint a token for `claims`.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, serde_json::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signature = URL_SAFE_NO_PAD.encode(self.signature(payload.as_bytes()));
        Ok(format!("{payload}.{signature}"))
    }

    /// Check signature and expiry. `now_secs` is the current Unix time.
    pub fn verify(&self, token: &str, now_secs: i64) -> Result<TokenClaims, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let (payload, signature) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
        if payload.is_empty() || signature.contains('.') {
            return Err(AuthError::MalformedToken);
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::MalformedToken)?;

        let expected = self.signature(payload.as_bytes());
        if !bool::from(expected.as_slice().ct_eq(signature.as_slice())) {
            return Err(AuthError::InvalidSignature);
        }

        let claims: TokenClaims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|json| serde_json::from_slice(&json).ok())
            .ok_or(AuthError::MalformedToken)?;
        if claims.exp <= now_secs {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn signature(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
