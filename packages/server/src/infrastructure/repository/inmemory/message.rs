//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! 挿入順の Vec をインメモリ DB として使用します。
//!
//! 各操作は 1 回のロック取得内で完結するため、既読追加やピンのトグルは
//! 他の操作に対してアトミックです。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    CohortId, Message, MessageId, MessageRepository, PageRequest, ReceiptOutcome,
    RepositoryError, Timestamp, UserId,
};

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    /// 作成順に並んだメッセージ
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存されているメッセージ数
    pub async fn count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Conflict(format!(
                "message '{}' already exists",
                message.id
            )));
        }
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn add_read_receipt(
        &self,
        id: &MessageId,
        user_id: UserId,
        read_at: Timestamp,
    ) -> Result<ReceiptOutcome, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_str().to_string()))?;
        if message.mark_read(user_id, read_at) {
            Ok(ReceiptOutcome::Added(message.clone()))
        } else {
            Ok(ReceiptOutcome::AlreadyRead(message.clone()))
        }
    }

    async fn toggle_pinned(&self, id: &MessageId) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_str().to_string()))?;
        message.toggle_pinned();
        Ok(message.clone())
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let before = messages.len();
        messages.retain(|m| &m.id != id);
        Ok(messages.len() != before)
    }

    async fn list_by_cohort(
        &self,
        cohort_id: &CohortId,
        page: PageRequest,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        let in_cohort: Vec<&Message> = messages
            .iter()
            .filter(|m| m.cohort_id() == cohort_id)
            .collect();

        let end = match &page.before {
            Some(before) => in_cohort
                .iter()
                .position(|m| &m.id == before)
                .ok_or_else(|| RepositoryError::NotFound(before.as_str().to_string()))?,
            None => in_cohort.len(),
        };
        let start = end.saturating_sub(page.limit);

        Ok(in_cohort[start..end].iter().map(|m| (*m).clone()).collect())
    }
}
