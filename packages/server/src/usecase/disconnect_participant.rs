//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時のクリーンアップ（MessagePusher、全ルーム、Presence）
//!
//! ### なぜこのテストが必要か
//! - 切断後の接続がルームに残ると、閉じたチャンネルへの配送が発生する
//! - 最後の接続が切れた時だけユーザーがオフラインになることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加中の接続の切断
//! - エッジケース：同一ユーザーの別接続が残っている場合
//! - エッジケース：二重の切断処理

use std::sync::Arc;

use cohort_chat_shared::time::timestamp_to_rfc3339;

use crate::domain::{CohortId, Connection, MessagePusher, PresenceRegistry, RoomMultiplexer};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// 退出したルーム
    pub left_rooms: Vec<CohortId>,
    /// この切断でユーザーがオフラインになったか
    pub went_offline: bool,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    rooms: Arc<RoomMultiplexer>,
    presence: Arc<PresenceRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        rooms: Arc<RoomMultiplexer>,
        presence: Arc<PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            rooms,
            presence,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// 1. MessagePusher から登録解除（以降この接続には何も届かない）
    /// 2. 参加中の全ルームから退出
    /// 3. Presence から登録解除（最後の接続なら残りの接続へ activeUsers）
    ///
    /// 何度呼んでも安全（二度目以降は何もしない）。
    pub fn execute(&self, connection: &Connection) -> DisconnectOutcome {
        self.message_pusher.unregister_client(&connection.id);
        let left_rooms = self.rooms.leave_all(&connection.id);
        let went_offline = self
            .presence
            .unregister(connection.user_id(), &connection.id);

        tracing::info!(
            "Connection '{}' of user '{}' (since {}) cleaned up (left {} rooms, offline: {})",
            connection.id,
            connection.user_id(),
            timestamp_to_rfc3339(connection.connected_at.value()),
            left_rooms.len(),
            went_offline
        );

        DisconnectOutcome {
            left_rooms,
            went_offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        OutboundEvent, Role,
        testing::{cohort, identity},
    };
    use crate::usecase::test_support::Harness;

    fn usecase(harness: &Harness) -> DisconnectParticipantUseCase {
        DisconnectParticipantUseCase::new(
            harness.rooms.clone(),
            harness.presence.clone(),
            harness.pusher.clone(),
        )
    }

    #[test]
    fn test_disconnect_removes_all_memberships_and_presence() {
        // テスト項目: 切断で全ルームと Presence から削除され、以降何も届かない
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let alice = harness.connect_to("alice", Role::Student, "cohort-1");
        harness.rooms.join(&alice.id, &cohort("cohort-2"));
        let bob = harness.connect_to("bob", Role::Student, "cohort-1");
        harness.pusher.clear();

        // when (操作):
        let outcome = usecase.execute(&alice);

        // then (期待する結果):
        assert_eq!(
            outcome,
            DisconnectOutcome {
                left_rooms: vec![cohort("cohort-1"), cohort("cohort-2")],
                went_offline: true,
            }
        );
        assert!(harness.rooms.rooms_of(&alice.id).is_empty());
        assert_eq!(harness.rooms.members(&cohort("cohort-1")), vec![bob.id.clone()]);
        assert!(!harness.presence.is_online(alice.user_id()));

        // 残りの接続には activeUsers が届き、切断した接続には届かない
        let bob_events = harness.pusher.events_for(&bob.id);
        assert!(matches!(
            bob_events.as_slice(),
            [OutboundEvent::ActiveUsers(users)] if users.len() == 1 && users[0].id.as_str() == "bob"
        ));
        harness.rooms.broadcast(
            &cohort("cohort-1"),
            &OutboundEvent::JoinedCohort(cohort("cohort-1")),
            None,
        );
        assert!(harness.pusher.events_for(&alice.id).is_empty());
    }

    #[test]
    fn test_disconnect_one_of_two_tabs_keeps_user_online() {
        // テスト項目: 別の接続が残っていればオンラインのまま
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let alice = identity("alice", Role::Student, &["cohort-1"]);
        let tab1 = harness.connect(alice.clone());
        let _tab2 = harness.connect(alice);

        // when (操作):
        let outcome = usecase.execute(&tab1);

        // then (期待する結果):
        assert!(!outcome.went_offline);
        assert!(harness.presence.is_online(tab1.user_id()));
    }

    #[test]
    fn test_disconnect_twice_is_noop() {
        // テスト項目: 二重の切断処理は何もしない
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let alice = harness.connect_to("alice", Role::Student, "cohort-1");
        usecase.execute(&alice);

        // when (操作):
        let outcome = usecase.execute(&alice);

        // then (期待する結果):
        assert!(outcome.left_rooms.is_empty());
        assert!(!outcome.went_offline);
    }
}
