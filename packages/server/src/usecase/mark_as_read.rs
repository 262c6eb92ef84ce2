//! UseCase: 既読処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MarkAsReadUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 同じユーザーが二回既読にしても、既読が重複せずブロードキャストも一回であることを保証
//! - 既読イベントがメッセージの属するルームにだけ届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回の既読
//! - エッジケース：二重の既読、同時の既読
//! - 異常系：存在しないメッセージ、アクセス権のないコホートのメッセージ、ストアの書き込み失敗

use std::sync::Arc;

use cohort_chat_shared::time::Clock;

use crate::domain::{
    Connection, MessageId, MessageRepository, OutboundEvent, ReceiptOutcome, RoomMultiplexer,
    Timestamp,
};

use super::{ChatError, guard};

/// 既読のユースケース
pub struct MarkAsReadUseCase {
    repository: Arc<dyn MessageRepository>,
    rooms: Arc<RoomMultiplexer>,
    clock: Arc<dyn Clock>,
}

impl MarkAsReadUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        rooms: Arc<RoomMultiplexer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            rooms,
            clock,
        }
    }

    /// 既読を記録する
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 既読を追加し、ルームに `messageRead` をブロードキャストした
    /// * `Ok(false)` - 既に既読だった（何も変更せず、何も送らない）
    pub async fn execute(&self, connection: &Connection, message_id: String) -> Result<bool, ChatError> {
        let identity = &connection.identity;
        let message_id = MessageId::new(message_id)?;
        let message = guard::find_message(self.repository.as_ref(), &message_id).await?;
        if !identity.can_access(message.cohort_id()) {
            return Err(ChatError::forbidden(format!(
                "not a member of cohort '{}'",
                message.cohort_id()
            )));
        }

        let read_at = Timestamp::new(self.clock.now_millis());
        let outcome = self
            .repository
            .add_read_receipt(&message_id, identity.id.clone(), read_at)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store read receipt for '{}': {}", message_id, e);
                ChatError::from(e)
            })?;

        match outcome {
            ReceiptOutcome::AlreadyRead(_) => {
                tracing::debug!("User '{}' already read '{}'", identity.id, message_id);
                Ok(false)
            }
            ReceiptOutcome::Added(updated) => {
                let event = OutboundEvent::MessageRead {
                    message_id,
                    user_id: identity.id.clone(),
                    user_name: identity.name.clone(),
                    read_at,
                };
                self.rooms.broadcast(updated.cohort_id(), &event, None);
                Ok(true)
            }
        }
    }
}
