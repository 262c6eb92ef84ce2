//! UseCase: コホートのメッセージ履歴取得
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - GetCohortMessagesUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ブロードキャストを受け損ねたクライアントが履歴から状態を復元できることを保証
//! - 送信者の表示情報がディレクトリから解決されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：最新 N 件、`before` カーソルによる遡り
//! - エッジケース：ディレクトリに存在しない送信者
//! - 異常系：アクセス権のないコホート

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    CohortId, Identity, IdentityDirectory, MessageId, MessageRepository, PageRequest, Profile,
    ResolvedMessage, UserId,
};

use super::{ChatError, guard};

/// 履歴取得のユースケース
pub struct GetCohortMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
    directory: Arc<dyn IdentityDirectory>,
}

impl GetCohortMessagesUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            repository,
            directory,
        }
    }

    /// 履歴を古い順で返す
    ///
    /// `limit` は既定 50 件・最大 100 件。`before` はメッセージ ID のカーソル。
    pub async fn execute(
        &self,
        identity: &Identity,
        cohort_id: String,
        limit: Option<usize>,
        before: Option<String>,
    ) -> Result<(CohortId, Vec<ResolvedMessage>), ChatError> {
        let cohort_id = guard::accessible_cohort(identity, cohort_id)?;
        let before = before.map(MessageId::new).transpose()?;
        let page = PageRequest::new(limit, before);

        let messages = self.repository.list_by_cohort(&cohort_id, page).await?;

        let mut senders: HashMap<UserId, Profile> = HashMap::new();
        let mut resolved = Vec::with_capacity(messages.len());
        for message in messages {
            let sender = match senders.get(&message.sender_id) {
                Some(profile) => profile.clone(),
                None => {
                    let profile = self
                        .directory
                        .find(&message.sender_id)
                        .await
                        .map(|found| found.profile())
                        .unwrap_or_else(|| Profile::unknown(message.sender_id.clone()));
                    senders.insert(message.sender_id.clone(), profile.clone());
                    profile
                }
            };
            resolved.push(ResolvedMessage { message, sender });
        }

        tracing::debug!(
            "Loaded {} messages of '{}' for '{}'",
            resolved.len(),
            cohort_id,
            identity.id
        );
        Ok((cohort_id, resolved))
    }
}
