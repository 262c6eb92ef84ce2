//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 検証 → 永続化 → ブロードキャスト の順序
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージが絶対にブロードキャストされないことを保証
//! - 送信者自身にもメッセージがエコーされることを確認
//! - 添付ファイル・返信先・アナウンスの検証
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキスト送信、ファイル送信、返信、facilitator のアナウンス
//! - 異常系：空メッセージ、容量超過、ストア障害、権限不足、不正な添付ファイル
//! - エッジケース：ルームに参加せずに送信した場合

use std::sync::Arc;

use cohort_chat_shared::time::Clock;

use crate::domain::{
    CohortId, Connection, FileAttachment, Message, MessageContent, MessageId, MessageIdFactory,
    MessageKind, MessagePusher, MessageRepository, OutboundEvent, ResolvedMessage,
    RoomMultiplexer, Timestamp, is_elevated,
};

use super::{ChatError, guard};

const UPLOADS_PREFIX: &str = "/uploads/";

/// 送信リクエスト（クライアントから受け取った未検証の値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub cohort_id: String,
    pub content: String,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub reply_to: Option<String>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
    rooms: Arc<RoomMultiplexer>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        rooms: Arc<RoomMultiplexer>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            rooms,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 1. 権限と内容を検証
    /// 2. サーバー側で ID と時刻を採番して永続化
    /// 3. 送信者の表示情報を付けてルーム全体（送信者を含む）にブロードキャスト
    ///
    /// 永続化に失敗した場合は何もブロードキャストせずにエラーを返す。
    pub async fn execute(
        &self,
        connection: &Connection,
        command: SendMessageCommand,
    ) -> Result<ResolvedMessage, ChatError> {
        let identity = &connection.identity;
        let cohort_id = guard::accessible_cohort(identity, command.cohort_id)?;

        if command.kind == MessageKind::Announcement && !is_elevated(identity) {
            tracing::warn!(
                "User '{}' tried to post an announcement without an elevated role",
                identity.id
            );
            return Err(ChatError::forbidden(
                "announcements require a facilitator or admin role",
            ));
        }

        let content = MessageContent::new(command.content)?;
        let file = validate_attachment(
            command.kind,
            command.file_url,
            command.file_name,
            command.file_size,
        )?;
        if content.is_empty() && file.is_none() {
            return Err(ChatError::invalid("message content must not be empty"));
        }

        let reply_to = match command.reply_to {
            Some(raw) => Some(self.validate_reply(raw, &cohort_id).await?),
            None => None,
        };

        let message = Message::new(
            MessageIdFactory::generate(),
            cohort_id.clone(),
            identity.id.clone(),
            content,
            command.kind,
            file,
            reply_to,
            Timestamp::new(self.clock.now_millis()),
        );

        let stored = self.repository.create(message).await.map_err(|e| {
            tracing::error!(
                "Failed to persist message from '{}' in cohort '{}': {}",
                identity.id,
                cohort_id,
                e
            );
            ChatError::Persistence(e)
        })?;

        let resolved = ResolvedMessage {
            message: stored,
            sender: identity.profile(),
        };
        let event = OutboundEvent::NewMessage(resolved.clone());

        // A sender that never joined still gets its own echo.
        let sender_joined = self.rooms.is_member(&connection.id, &cohort_id);
        let delivered = self.rooms.broadcast(&cohort_id, &event, None);
        if !sender_joined
            && let Err(e) = self.message_pusher.push_to(&connection.id, &event)
        {
            tracing::warn!("Failed to echo message to '{}': {}", connection.id, e);
        }

        tracing::debug!(
            "Message '{}' stored and delivered to {} connections in '{}'",
            resolved.message.id,
            delivered,
            cohort_id
        );
        Ok(resolved)
    }

    /// 返信先は同じコホートに存在するメッセージでなければならない
    async fn validate_reply(&self, raw: String, cohort_id: &CohortId) -> Result<MessageId, ChatError> {
        let reply_to = MessageId::new(raw)?;
        let target = guard::find_message(self.repository.as_ref(), &reply_to)
            .await
            .map_err(|e| match e {
                ChatError::NotFound(_) => {
                    ChatError::invalid(format!("reply target '{reply_to}' does not exist"))
                }
                other => other,
            })?;
        guard::ensure_same_cohort(&target, cohort_id)?;
        Ok(reply_to)
    }
}

fn validate_attachment(
    kind: MessageKind,
    url: Option<String>,
    name: Option<String>,
    size: Option<u64>,
) -> Result<Option<FileAttachment>, ChatError> {
    if !kind.requires_attachment() {
        if url.is_some() || name.is_some() || size.is_some() {
            return Err(ChatError::invalid(
                "attachments are only allowed on file and image messages",
            ));
        }
        return Ok(None);
    }

    let url = url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ChatError::invalid("fileUrl is required for file and image messages"))?;
    if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with(UPLOADS_PREFIX))
    {
        return Err(ChatError::invalid(
            "fileUrl must be an http(s) URL or an /uploads/ path",
        ));
    }
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ChatError::invalid("fileName is required for file and image messages"))?;
    if size == Some(0) {
        return Err(ChatError::invalid("fileSize must be greater than zero"));
    }

    Ok(Some(FileAttachment { url, name, size }))
}
