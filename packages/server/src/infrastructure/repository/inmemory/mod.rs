//! In-memory stores backing the message and identity ports.

pub mod identity;
pub mod message;

pub use identity::{IdentitySeedError, InMemoryIdentityDirectory};
pub use message::InMemoryMessageRepository;
