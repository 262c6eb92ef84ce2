//! WebSocket wire events.
//!
//! Every frame is a JSON object with a camelCase `type` tag and its payload
//! fields inline, e.g. `{"type":"joinCohort","cohortId":"cohort-1"}`.

use serde::{Deserialize, Serialize};

use super::identity::RoleDto;

/// Message kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTypeDto {
    #[default]
    Text,
    File,
    Image,
    Announcement,
}

/// Client → server events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinCohort {
        cohort_id: String,
    },
    LeaveCohort {
        cohort_id: String,
    },
    SendMessage {
        cohort_id: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        message_type: MessageTypeDto,
        #[serde(default)]
        file_url: Option<String>,
        #[serde(default)]
        file_name: Option<String>,
        #[serde(default)]
        file_size: Option<u64>,
        #[serde(default)]
        reply_to: Option<String>,
    },
    Typing {
        cohort_id: String,
        is_typing: bool,
    },
    MarkAsRead {
        message_id: String,
    },
    PinMessage {
        message_id: String,
        cohort_id: String,
    },
    DeleteMessage {
        message_id: String,
        cohort_id: String,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinCohort { .. } => "joinCohort",
            ClientEvent::LeaveCohort { .. } => "leaveCohort",
            ClientEvent::SendMessage { .. } => "sendMessage",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::MarkAsRead { .. } => "markAsRead",
            ClientEvent::PinMessage { .. } => "pinMessage",
            ClientEvent::DeleteMessage { .. } => "deleteMessage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: RoleDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub url: String,
    pub name: String,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptDto {
    pub user_id: String,
    pub read_at: i64,
}

/// Fully resolved message as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub cohort_id: String,
    pub sender: ProfileDto,
    pub content: String,
    pub message_type: MessageTypeDto,
    pub file: Option<FileDto>,
    pub is_pinned: bool,
    pub reply_to: Option<String>,
    /// Unix milliseconds (UTC)
    pub created_at: i64,
    pub read_by: Vec<ReadReceiptDto>,
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    NewMessage {
        message: MessageDto,
    },
    UserTyping {
        cohort_id: String,
        user_id: String,
        user_name: String,
        is_typing: bool,
    },
    MessageRead {
        message_id: String,
        user_id: String,
        user_name: String,
        read_at: i64,
    },
    MessagePinned {
        message_id: String,
        is_pinned: bool,
    },
    MessageDeleted {
        message_id: String,
    },
    ActiveUsers {
        users: Vec<ProfileDto>,
    },
    JoinedCohort {
        cohort_id: String,
    },
    LeftCohort {
        cohort_id: String,
    },
    Error {
        code: String,
        message: String,
    },
}
