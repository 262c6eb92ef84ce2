//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{CohortId, Identity, Message, MessageId, RepositoryError, Timestamp, UserId};

/// Default number of messages returned by a history query.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Upper bound for a history query.
pub const MAX_PAGE_SIZE: usize = 100;

/// History query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of messages to return (clamped to `1..=MAX_PAGE_SIZE`).
    pub limit: usize,
    /// Only return messages older than this one.
    pub before: Option<MessageId>,
}

impl PageRequest {
    pub fn new(limit: Option<usize>, before: Option<MessageId>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            before,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Result of an idempotent read-receipt upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// A new receipt was stored.
    Added(Message),
    /// The user already had a receipt; nothing changed.
    AlreadyRead(Message),
}

/// Message store.
///
/// Every mutation is atomic with respect to other calls on the same store, so
/// concurrent read receipts or pin toggles on one message cannot lose updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message. Fails with `Conflict` if the id is taken.
    async fn create(&self, message: Message) -> Result<Message, RepositoryError>;

    /// メッセージを ID で取得
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// 既読を追加（同一ユーザーの既読は重複しない）
    async fn add_read_receipt(
        &self,
        id: &MessageId,
        user_id: UserId,
        read_at: Timestamp,
    ) -> Result<ReceiptOutcome, RepositoryError>;

    /// ピン状態をトグルし、更新後のメッセージを返す
    async fn toggle_pinned(&self, id: &MessageId) -> Result<Message, RepositoryError>;

    /// メッセージを削除。存在しなかった場合は `false`
    async fn delete(&self, id: &MessageId) -> Result<bool, RepositoryError>;

    /// Messages of one cohort, oldest first, ending right before `page.before`.
    async fn list_by_cohort(
        &self,
        cohort_id: &CohortId,
        page: PageRequest,
    ) -> Result<Vec<Message>, RepositoryError>;
}

/// Lookup of identities owned by the authentication collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn find(&self, id: &UserId) -> Option<Identity>;
}
