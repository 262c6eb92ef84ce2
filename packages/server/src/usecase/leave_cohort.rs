//! UseCase: コホートルームからの退出

use std::sync::Arc;

use crate::domain::{CohortId, Connection, MessagePusher, OutboundEvent, RoomMultiplexer};

use super::ChatError;

/// ルーム退出のユースケース
pub struct LeaveCohortUseCase {
    rooms: Arc<RoomMultiplexer>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveCohortUseCase {
    pub fn new(rooms: Arc<RoomMultiplexer>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// ルーム退出を実行し、`leftCohort` を本人に返す
    ///
    /// 退出にアクセス権は不要。参加していないルームからの退出も成功扱い。
    pub fn execute(&self, connection: &Connection, cohort_id: String) -> Result<CohortId, ChatError> {
        let cohort_id = CohortId::new(cohort_id)?;

        if self.rooms.leave(&connection.id, &cohort_id) {
            tracing::info!(
                "User '{}' left cohort '{}' ({})",
                connection.user_id(),
                cohort_id,
                connection.id
            );
        }

        if let Err(e) = self
            .message_pusher
            .push_to(&connection.id, &OutboundEvent::LeftCohort(cohort_id.clone()))
        {
            tracing::warn!("Failed to acknowledge leave to '{}': {}", connection.id, e);
        }
        Ok(cohort_id)
    }
}
