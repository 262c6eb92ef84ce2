//! UseCase: コホートルームへの参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinCohortUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - メンバーでないコホートのブロードキャストを受信できないことを保証
//! - 参加が冪等であることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーの参加、admin の参加、二重参加
//! - 異常系：メンバーでないユーザー、不正なコホート ID

use std::sync::Arc;

use crate::domain::{CohortId, Connection, MessagePusher, OutboundEvent, RoomMultiplexer};

use super::{ChatError, guard};

/// ルーム参加のユースケース
pub struct JoinCohortUseCase {
    rooms: Arc<RoomMultiplexer>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinCohortUseCase {
    pub fn new(rooms: Arc<RoomMultiplexer>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// ルーム参加を実行し、`joinedCohort` を本人に返す
    ///
    /// 既に参加済みでも確認応答は送られる。
    pub fn execute(&self, connection: &Connection, cohort_id: String) -> Result<CohortId, ChatError> {
        let cohort_id = guard::accessible_cohort(&connection.identity, cohort_id)?;

        if self.rooms.join(&connection.id, &cohort_id) {
            tracing::info!(
                "User '{}' joined cohort '{}' ({})",
                connection.user_id(),
                cohort_id,
                connection.id
            );
        }

        if let Err(e) = self
            .message_pusher
            .push_to(&connection.id, &OutboundEvent::JoinedCohort(cohort_id.clone()))
        {
            tracing::warn!("Failed to acknowledge join to '{}': {}", connection.id, e);
        }
        Ok(cohort_id)
    }
}
