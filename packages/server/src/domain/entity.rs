//! Domain entities.

use std::{collections::BTreeSet, sync::Arc};

use super::{CohortId, ConnectionId, MessageContent, MessageId, Timestamp, UserId};

/// Participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Facilitator,
    Admin,
}

impl Role {
    /// Facilitators and admins may moderate (pin, delete any message).
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Facilitator | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Facilitator => "facilitator",
            Role::Admin => "admin",
        }
    }
}

/// Authenticated participant.
///
/// A connection holds an immutable snapshot of its identity for its whole
/// lifetime; picking up changes requires reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub cohorts: BTreeSet<CohortId>,
}

impl Identity {
    /// Admins reach every cohort; everyone else only the cohorts they belong to.
    pub fn can_access(&self, cohort_id: &CohortId) -> bool {
        self.role == Role::Admin || self.cohorts.contains(cohort_id)
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            role: self.role,
        }
    }
}

/// Role-check predicate used by moderation.
pub fn is_elevated(identity: &Identity) -> bool {
    identity.role.is_elevated()
}

/// Public display fields of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
}

impl Profile {
    /// Placeholder for senders no longer known to the identity directory.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: "Unknown user".to_string(),
            avatar: None,
            role: Role::Student,
        }
    }
}

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    File,
    Image,
    Announcement,
}

impl MessageKind {
    /// File and image messages carry an attachment and may have an empty body.
    pub fn requires_attachment(&self) -> bool {
        matches!(self, MessageKind::File | MessageKind::Image)
    }
}

/// Reference to an uploaded file. Storage itself lives outside this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub url: String,
    pub name: String,
    pub size: Option<u64>,
}

/// A single read receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub user_id: UserId,
    pub read_at: Timestamp,
}

/// Persisted chat message.
///
/// The cohort is fixed at creation and the receipt list holds at most one
/// entry per user; both are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    cohort_id: CohortId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub kind: MessageKind,
    pub file: Option<FileAttachment>,
    pub pinned: bool,
    pub reply_to: Option<MessageId>,
    pub created_at: Timestamp,
    read_by: Vec<ReadReceipt>,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MessageId,
        cohort_id: CohortId,
        sender_id: UserId,
        content: MessageContent,
        kind: MessageKind,
        file: Option<FileAttachment>,
        reply_to: Option<MessageId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            cohort_id,
            sender_id,
            content,
            kind,
            file,
            pinned: false,
            reply_to,
            created_at,
            read_by: Vec::new(),
        }
    }

    pub fn cohort_id(&self) -> &CohortId {
        &self.cohort_id
    }

    pub fn read_by(&self) -> &[ReadReceipt] {
        &self.read_by
    }

    pub fn has_read(&self, user_id: &UserId) -> bool {
        self.read_by.iter().any(|r| &r.user_id == user_id)
    }

    /// Record that `user_id` read this message.
    ///
    /// Returns `false` and leaves the receipts untouched if the user already
    /// has a receipt.
    pub fn mark_read(&mut self, user_id: UserId, read_at: Timestamp) -> bool {
        if self.has_read(&user_id) {
            return false;
        }
        self.read_by.push(ReadReceipt { user_id, read_at });
        true
    }

    /// Flip the pinned flag and return the new state.
    pub fn toggle_pinned(&mut self) -> bool {
        self.pinned = !self.pinned;
        self.pinned
    }
}

/// A live connection bound to exactly one identity.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Arc<Identity>,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: Arc<Identity>, connected_at: Timestamp) -> Self {
        Self {
            id,
            identity,
            connected_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageIdFactory;

    fn identity(role: Role, cohorts: &[&str]) -> Identity {
        Identity {
            id: UserId::new("u-1".to_string()).unwrap(),
            name: "Ada".to_string(),
            avatar: None,
            role,
            cohorts: cohorts
                .iter()
                .map(|c| CohortId::new(c.to_string()).unwrap())
                .collect(),
        }
    }

    fn message() -> Message {
        Message::new(
            MessageIdFactory::generate(),
            CohortId::new("cohort-1".to_string()).unwrap(),
            UserId::new("u-1".to_string()).unwrap(),
            MessageContent::new("hello".to_string()).unwrap(),
            MessageKind::Text,
            None,
            None,
            Timestamp::new(1_000),
        )
    }

    #[test]
    fn test_role_elevation() {
        // テスト項目: facilitator と admin のみが昇格ロールである
        assert!(!Role::Student.is_elevated());
        assert!(Role::Facilitator.is_elevated());
        assert!(Role::Admin.is_elevated());
    }

    #[test]
    fn test_cohort_access() {
        // テスト項目: メンバーと admin のみがコホートにアクセスできる
        // given (前提条件):
        let cohort = CohortId::new("cohort-1".to_string()).unwrap();
        let other = CohortId::new("cohort-2".to_string()).unwrap();
        let student = identity(Role::Student, &["cohort-1"]);
        let facilitator = identity(Role::Facilitator, &["cohort-1"]);
        let admin = identity(Role::Admin, &[]);

        // when (操作) / then (期待する結果):
        assert!(student.can_access(&cohort));
        assert!(!student.can_access(&other));
        assert!(!facilitator.can_access(&other));
        assert!(admin.can_access(&other));
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        // テスト項目: 同じユーザーの既読は一度だけ記録される
        // given (前提条件):
        let mut msg = message();
        let reader = UserId::new("u-2".to_string()).unwrap();

        // when (操作):
        let first = msg.mark_read(reader.clone(), Timestamp::new(2_000));
        let second = msg.mark_read(reader.clone(), Timestamp::new(3_000));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(msg.read_by().len(), 1);
        assert_eq!(msg.read_by()[0].read_at, Timestamp::new(2_000));
    }

    #[test]
    fn test_toggle_pinned() {
        // テスト項目: ピン状態がトグルされる
        let mut msg = message();
        assert!(msg.toggle_pinned());
        assert!(msg.pinned);
        assert!(!msg.toggle_pinned());
        assert!(!msg.pinned);
    }
}
