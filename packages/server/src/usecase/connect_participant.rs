//! UseCase: 参加者接続処理（Connection Gate + Presence 登録）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authenticate() / execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ハンドシェイクは fail closed でなければならない（ルーム操作の前に拒否）
//! - 接続ごとにユーザー情報が一度だけ束縛されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続、同一ユーザーの複数接続
//! - 異常系：トークンなし、無効なトークン

use std::sync::Arc;

use cohort_chat_shared::time::Clock;

use crate::domain::{
    AuthError, Connection, ConnectionIdFactory, Identity, IdentityResolver, MessagePusher,
    PresenceRegistry, PusherChannel, Timestamp,
};

use super::ChatError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// IdentityResolver（トークン検証の抽象化）
    resolver: Arc<dyn IdentityResolver>,
    /// PresenceRegistry（オンライン状態）
    presence: Arc<PresenceRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        presence: Arc<PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            presence,
            message_pusher,
            clock,
        }
    }

    /// ハンドシェイク時の認証
    ///
    /// WebSocket へのアップグレード前に呼ばれる。失敗した場合、接続は確立されない。
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Arc<Identity>, ChatError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let identity = self.resolver.resolve(token).await?;
        Ok(Arc::new(identity))
    }

    /// 認証済みのユーザーで接続を確立
    ///
    /// 1. 接続 ID を採番
    /// 2. MessagePusher に送信チャンネルを登録
    /// 3. Presence に登録（全接続へ activeUsers が送られる）
    ///
    /// # Returns
    ///
    /// ユーザー情報が束縛された `Connection`（接続の生存期間中は不変）
    pub fn execute(&self, identity: Arc<Identity>, sender: PusherChannel) -> Connection {
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            identity,
            Timestamp::new(self.clock.now_millis()),
        );

        self.message_pusher
            .register_client(connection.id.clone(), sender);
        let count = self
            .presence
            .register(connection.identity.clone(), connection.id.clone());

        tracing::info!(
            "User '{}' connected as '{}' ({} live connections)",
            connection.user_id(),
            connection.id,
            count
        );
        connection
    }
}
