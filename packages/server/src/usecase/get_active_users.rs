//! UseCase: オンラインユーザー一覧の取得

use std::sync::Arc;

use crate::domain::{PresenceRegistry, Profile};

pub struct GetActiveUsersUseCase {
    presence: Arc<PresenceRegistry>,
}

impl GetActiveUsersUseCase {
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }

    /// 重複のないオンラインユーザー一覧
    pub fn execute(&self) -> Vec<Profile> {
        self.presence.snapshot()
    }
}
