//! UseCase: メッセージ削除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DeleteMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 送信者本人か facilitator/admin だけが削除できることを保証
//! - 削除イベントに本文が含まれないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者本人の削除、facilitator / admin の削除（コホート外も含む）
//! - 異常系：他人のメッセージを student が削除、ストアが削除に失敗

use std::sync::Arc;

use crate::domain::{
    CohortId, Connection, MessageId, MessageRepository, OutboundEvent, RoomMultiplexer,
    is_elevated,
};

use super::{ChatError, guard};

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    rooms: Arc<RoomMultiplexer>,
}

impl DeleteMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, rooms: Arc<RoomMultiplexer>) -> Self {
        Self { repository, rooms }
    }

    /// メッセージを削除し、ID のみをルームにブロードキャストする
    pub async fn execute(
        &self,
        connection: &Connection,
        message_id: String,
        cohort_id: String,
    ) -> Result<MessageId, ChatError> {
        let identity = &connection.identity;
        let message_id = MessageId::new(message_id)?;
        let claimed = CohortId::new(cohort_id)?;
        let message = guard::find_message(self.repository.as_ref(), &message_id).await?;
        guard::ensure_same_cohort(&message, &claimed)?;

        let is_sender = message.sender_id == identity.id;
        if !is_sender && !is_elevated(identity) {
            tracing::warn!(
                "User '{}' tried to delete '{}' sent by '{}'",
                identity.id,
                message_id,
                message.sender_id
            );
            return Err(ChatError::forbidden(
                "only the sender or a moderator may delete this message",
            ));
        }

        let deleted = self.repository.delete(&message_id).await.map_err(|e| {
            tracing::error!("Failed to delete '{}': {}", message_id, e);
            ChatError::from(e)
        })?;
        if !deleted {
            return Err(ChatError::NotFound(format!("message '{message_id}'")));
        }

        tracing::info!("User '{}' deleted '{}'", identity.id, message_id);
        let event = OutboundEvent::MessageDeleted {
            message_id: message_id.clone(),
        };
        self.rooms.broadcast(message.cohort_id(), &event, None);
        Ok(message_id)
    }
}
