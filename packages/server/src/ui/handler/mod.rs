//! Request handlers.

mod dispatch;
mod http;
mod websocket;

use axum::http::{HeaderMap, header::AUTHORIZATION};

pub use http::{get_active_users, get_cohort_messages, health_check};
pub use websocket::websocket_handler;

/// Token carried by an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Handshake credential: a non-blank `token` query value, else the Bearer header.
fn handshake_token<'a>(query: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(headers))
}
