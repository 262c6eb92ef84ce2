//! Repository implementations.

pub mod inmemory;

pub use inmemory::{IdentitySeedError, InMemoryIdentityDirectory, InMemoryMessageRepository};
