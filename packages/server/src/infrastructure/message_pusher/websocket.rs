//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - ドメインイベントを JSON にエンコードしてクライアントへ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 実際のソケット書き込みは接続ごとの writer タスクが行うため、ここでの送信は
//! チャンネルへの enqueue だけで完了します。

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundEvent, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: ConnectionId
    /// Value: PusherChannel
    clients: RwLock<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中の接続数
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    fn encode(event: &OutboundEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(event))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        self.clients.write().insert(connection_id, sender);
    }

    fn unregister_client(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.clients.write().remove(connection_id).is_some();
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
        removed
    }

    fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.read();
        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;

        sender
            .send(Self::encode(event)?)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(
            "Pushed {} to connection '{}'",
            event.name(),
            connection_id
        );
        Ok(())
    }

    fn broadcast(&self, targets: &[ConnectionId], event: &OutboundEvent) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let content = match Self::encode(event) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to encode {}: {}", event.name(), e);
                return 0;
            }
        };

        let clients = self.clients.read();
        let mut delivered = 0;
        for target in targets {
            match clients.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Failed to push message to connection '{}': {}", target, e)
                    }
                },
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }
        delivered
    }
}
