//! UseCase: 入力中シグナルの中継
//!
//! 永続化を伴わない。このユースケースはメッセージストアを保持しない。

use std::sync::Arc;

use crate::domain::{Connection, OutboundEvent, RoomMultiplexer};

use super::{ChatError, guard};

/// 入力中シグナル中継のユースケース
pub struct RelayTypingUseCase {
    rooms: Arc<RoomMultiplexer>,
}

impl RelayTypingUseCase {
    pub fn new(rooms: Arc<RoomMultiplexer>) -> Self {
        Self { rooms }
    }

    /// 送信者以外のルームメンバーに `userTyping` を中継する
    ///
    /// # Returns
    ///
    /// 配送した接続数
    pub fn execute(
        &self,
        connection: &Connection,
        cohort_id: String,
        is_typing: bool,
    ) -> Result<usize, ChatError> {
        let identity = &connection.identity;
        let cohort_id = guard::accessible_cohort(identity, cohort_id)?;
        let event = OutboundEvent::UserTyping {
            cohort_id: cohort_id.clone(),
            user_id: identity.id.clone(),
            user_name: identity.name.clone(),
            is_typing,
        };
        Ok(self.rooms.broadcast(&cohort_id, &event, Some(&connection.id)))
    }
}
