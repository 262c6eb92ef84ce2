//! Events pushed from the server to connected clients.
//!
//! These are protocol-agnostic; the WebSocket pusher encodes them with the
//! wire DTOs in `infrastructure::dto::websocket`.

use super::{CohortId, Message, MessageId, Profile, Timestamp, UserId};

/// A stored message together with the sender's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    pub message: Message,
    pub sender: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    NewMessage(ResolvedMessage),
    UserTyping {
        cohort_id: CohortId,
        user_id: UserId,
        user_name: String,
        is_typing: bool,
    },
    MessageRead {
        message_id: MessageId,
        user_id: UserId,
        user_name: String,
        read_at: Timestamp,
    },
    MessagePinned {
        message_id: MessageId,
        is_pinned: bool,
    },
    /// Carries only the id; deleted content never leaves the server.
    MessageDeleted {
        message_id: MessageId,
    },
    ActiveUsers(Vec<Profile>),
    JoinedCohort(CohortId),
    LeftCohort(CohortId),
    /// Private to the connection whose action failed.
    Error {
        code: &'static str,
        message: String,
    },
}

impl OutboundEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::NewMessage(_) => "newMessage",
            OutboundEvent::UserTyping { .. } => "userTyping",
            OutboundEvent::MessageRead { .. } => "messageRead",
            OutboundEvent::MessagePinned { .. } => "messagePinned",
            OutboundEvent::MessageDeleted { .. } => "messageDeleted",
            OutboundEvent::ActiveUsers(_) => "activeUsers",
            OutboundEvent::JoinedCohort(_) => "joinedCohort",
            OutboundEvent::LeftCohort(_) => "leftCohort",
            OutboundEvent::Error { .. } => "error",
        }
    }
}
