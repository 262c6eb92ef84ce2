//! InMemory Identity Directory 実装
//!
//! 認証コラボレーターが持つユーザー情報の読み取り専用ビュー。
//! 起動時に JSON ファイルから読み込むか、テストでは直接構築します。

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    domain::{DomainError, Identity, IdentityDirectory, UserId},
    infrastructure::dto::identity::IdentityRecord,
};

/// Failure while loading the identity seed file.
#[derive(Debug, Error)]
pub enum IdentitySeedError {
    #[error("failed to read identity file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse identity file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid identity record: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Default)]
pub struct InMemoryIdentityDirectory {
    identities: RwLock<HashMap<UserId, Identity>>,
}

impl InMemoryIdentityDirectory {
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            identities: RwLock::new(
                identities
                    .into_iter()
                    .map(|identity| (identity.id.clone(), identity))
                    .collect(),
            ),
        }
    }

    /// Parse a JSON array of identity records.
    pub fn from_json(json: &str) -> Result<Self, IdentitySeedError> {
        let records: Vec<IdentityRecord> = serde_json::from_str(json)?;
        let identities = records
            .into_iter()
            .map(Identity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(identities))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, IdentitySeedError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Add or replace an identity.
    pub async fn insert(&self, identity: Identity) {
        self.identities
            .write()
            .await
            .insert(identity.id.clone(), identity);
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn find(&self, id: &UserId) -> Option<Identity> {
        self.identities.read().await.get(id).cloned()
    }
}
