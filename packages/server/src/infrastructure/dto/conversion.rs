//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeSet;

use crate::domain::{
    CohortId, DomainError, FileAttachment, Identity, MessageKind, OutboundEvent, Profile,
    ReadReceipt, ResolvedMessage, Role, UserId,
};
use crate::infrastructure::dto::{
    identity::{IdentityRecord, RoleDto},
    websocket::{FileDto, MessageDto, MessageTypeDto, ProfileDto, ReadReceiptDto, ServerEvent},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<RoleDto> for Role {
    fn from(dto: RoleDto) -> Self {
        match dto {
            RoleDto::Student => Role::Student,
            RoleDto::Facilitator => Role::Facilitator,
            RoleDto::Admin => Role::Admin,
        }
    }
}

impl From<MessageTypeDto> for MessageKind {
    fn from(dto: MessageTypeDto) -> Self {
        match dto {
            MessageTypeDto::Text => MessageKind::Text,
            MessageTypeDto::File => MessageKind::File,
            MessageTypeDto::Image => MessageKind::Image,
            MessageTypeDto::Announcement => MessageKind::Announcement,
        }
    }
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = DomainError;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        let cohorts = record
            .cohorts
            .into_iter()
            .map(CohortId::new)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            id: UserId::new(record.id)?,
            name: record.name,
            avatar: record.avatar,
            role: record.role.into(),
            cohorts,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => RoleDto::Student,
            Role::Facilitator => RoleDto::Facilitator,
            Role::Admin => RoleDto::Admin,
        }
    }
}

impl From<MessageKind> for MessageTypeDto {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => MessageTypeDto::Text,
            MessageKind::File => MessageTypeDto::File,
            MessageKind::Image => MessageTypeDto::Image,
            MessageKind::Announcement => MessageTypeDto::Announcement,
        }
    }
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.as_str().to_string(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            role: profile.role.into(),
        }
    }
}

impl From<&FileAttachment> for FileDto {
    fn from(file: &FileAttachment) -> Self {
        Self {
            url: file.url.clone(),
            name: file.name.clone(),
            size: file.size,
        }
    }
}

impl From<&ReadReceipt> for ReadReceiptDto {
    fn from(receipt: &ReadReceipt) -> Self {
        Self {
            user_id: receipt.user_id.as_str().to_string(),
            read_at: receipt.read_at.value(),
        }
    }
}

impl From<&ResolvedMessage> for MessageDto {
    fn from(resolved: &ResolvedMessage) -> Self {
        let message = &resolved.message;
        Self {
            id: message.id.as_str().to_string(),
            cohort_id: message.cohort_id().as_str().to_string(),
            sender: (&resolved.sender).into(),
            content: message.content.as_str().to_string(),
            message_type: message.kind.into(),
            file: message.file.as_ref().map(FileDto::from),
            is_pinned: message.pinned,
            reply_to: message.reply_to.as_ref().map(|id| id.as_str().to_string()),
            created_at: message.created_at.value(),
            read_by: message.read_by().iter().map(ReadReceiptDto::from).collect(),
        }
    }
}

impl From<&OutboundEvent> for ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::NewMessage(resolved) => ServerEvent::NewMessage {
                message: resolved.into(),
            },
            OutboundEvent::UserTyping {
                cohort_id,
                user_id,
                user_name,
                is_typing,
            } => ServerEvent::UserTyping {
                cohort_id: cohort_id.as_str().to_string(),
                user_id: user_id.as_str().to_string(),
                user_name: user_name.clone(),
                is_typing: *is_typing,
            },
            OutboundEvent::MessageRead {
                message_id,
                user_id,
                user_name,
                read_at,
            } => ServerEvent::MessageRead {
                message_id: message_id.as_str().to_string(),
                user_id: user_id.as_str().to_string(),
                user_name: user_name.clone(),
                read_at: read_at.value(),
            },
            OutboundEvent::MessagePinned {
                message_id,
                is_pinned,
            } => ServerEvent::MessagePinned {
                message_id: message_id.as_str().to_string(),
                is_pinned: *is_pinned,
            },
            OutboundEvent::MessageDeleted { message_id } => ServerEvent::MessageDeleted {
                message_id: message_id.as_str().to_string(),
            },
            OutboundEvent::ActiveUsers(users) => ServerEvent::ActiveUsers {
                users: users.iter().map(ProfileDto::from).collect(),
            },
            OutboundEvent::JoinedCohort(cohort_id) => ServerEvent::JoinedCohort {
                cohort_id: cohort_id.as_str().to_string(),
            },
            OutboundEvent::LeftCohort(cohort_id) => ServerEvent::LeftCohort {
                cohort_id: cohort_id.as_str().to_string(),
            },
            OutboundEvent::Error { code, message } => ServerEvent::Error {
                code: (*code).to_string(),
                message: message.clone(),
            },
        }
    }
}
