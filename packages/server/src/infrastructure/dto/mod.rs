//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs
//! - `http`: HTTP API DTOs
//! - `identity`: identity seed records

pub mod conversion;
pub mod http;
pub mod identity;
pub mod websocket;
