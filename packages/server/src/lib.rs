//! Real-time cohort chat and presence server.
//!
//! Authenticated WebSocket connections are multiplexed into per-cohort rooms.
//! Chat actions are persisted before they are broadcast; typing signals are
//! relayed without touching storage; presence is tracked process-wide.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
