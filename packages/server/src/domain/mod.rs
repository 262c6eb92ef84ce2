//! Domain layer: entities, value objects, in-memory coordination state, and
//! the ports implemented by the infrastructure layer.

pub mod auth;
pub mod entity;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod value_object;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::IdentityResolver;
pub use entity::{
    Connection, FileAttachment, Identity, Message, MessageKind, Profile, ReadReceipt, Role,
    is_elevated,
};
pub use error::{AuthError, DomainError, MessagePushError, RepositoryError};
pub use event::{OutboundEvent, ResolvedMessage};
pub use presence::PresenceRegistry;
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{IdentityDirectory, MessageRepository, PageRequest, ReceiptOutcome};
pub use room::RoomMultiplexer;
pub use value_object::{
    CohortId, ConnectionId, ConnectionIdFactory, MessageContent, MessageId, MessageIdFactory,
    Timestamp, UserId,
};
