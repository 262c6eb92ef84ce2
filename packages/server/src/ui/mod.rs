//! Axum front end: WebSocket gate, per-connection event loop and HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
