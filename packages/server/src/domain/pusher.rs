//! MessagePusher trait 定義
//!
//! クライアントへのイベント送信のインターフェース。
//!
//! 送信は同期的に行われる（チャンネルへの enqueue のみで I/O 待ちを伴わない）。
//! そのため Presence / Room のロックを保持したまま呼び出しても安全で、
//! ブロードキャスト対象の確定と配送が同じスナップショット上で行われる。

use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundEvent};

/// Outbound channel of a single connection. Each item is one encoded frame.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
pub trait MessagePusher: Send + Sync {
    /// Start delivering to `connection_id` through `sender`.
    fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Stop delivering to `connection_id`. Returns `false` if it was unknown.
    fn unregister_client(&self, connection_id: &ConnectionId) -> bool;

    /// Push an event to one connection.
    fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// Push an event to every target; unknown or closed targets are skipped.
    ///
    /// Returns the number of connections the event was handed to.
    fn broadcast(&self, targets: &[ConnectionId], event: &OutboundEvent) -> usize;
}
