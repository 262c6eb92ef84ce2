//! UseCase: ピン留め（トグル）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PinMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 権限のないユーザーの操作で状態が変わらず、何もブロードキャストされないことを保証
//! - ブロードキャスト先が保存されたメッセージのルームであることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：facilitator によるピン留めと解除（担当外のコホートも含む）
//! - 異常系：student による操作、コホート ID の不一致、存在しないメッセージ、ストアの書き込み失敗

use std::sync::Arc;

use crate::domain::{
    CohortId, Connection, MessageId, MessageRepository, OutboundEvent, RoomMultiplexer,
    is_elevated,
};

use super::{ChatError, guard};

/// ピン留めのユースケース
pub struct PinMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    rooms: Arc<RoomMultiplexer>,
}

impl PinMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, rooms: Arc<RoomMultiplexer>) -> Self {
        Self { repository, rooms }
    }

    /// ピン状態をトグルし、更新後の状態をルームにブロードキャストする
    ///
    /// # Returns
    ///
    /// 更新後のピン状態
    pub async fn execute(
        &self,
        connection: &Connection,
        message_id: String,
        cohort_id: String,
    ) -> Result<bool, ChatError> {
        let identity = &connection.identity;
        if !is_elevated(identity) {
            tracing::warn!("User '{}' tried to pin without an elevated role", identity.id);
            return Err(ChatError::forbidden(
                "pinning requires a facilitator or admin role",
            ));
        }

        let message_id = MessageId::new(message_id)?;
        let claimed = CohortId::new(cohort_id)?;
        let message = guard::find_message(self.repository.as_ref(), &message_id).await?;
        guard::ensure_same_cohort(&message, &claimed)?;

        let updated = self
            .repository
            .toggle_pinned(&message_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to toggle pin on '{}': {}", message_id, e);
                ChatError::from(e)
            })?;

        tracing::info!(
            "User '{}' set pinned={} on '{}'",
            identity.id,
            updated.pinned,
            message_id
        );
        let event = OutboundEvent::MessagePinned {
            message_id,
            is_pinned: updated.pinned,
        };
        self.rooms.broadcast(updated.cohort_id(), &event, None);
        Ok(updated.pinned)
    }
}
