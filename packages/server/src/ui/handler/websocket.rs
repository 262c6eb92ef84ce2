//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{domain::Identity, ui::state::AppState};

use super::{dispatch::handle_text, handshake_token};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Connection Gate.
///
/// The credential is verified before the upgrade; a failed check answers
/// `401` and no socket is ever opened.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let token = handshake_token(query.token.as_deref(), &headers);

    let identity = match state.connect_participant_usecase.authenticate(token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// Spawns a task that drains the connection's channel into the WebSocket sink.
///
/// Every event for this connection (room broadcasts, presence, private errors)
/// goes through the channel registered with the MessagePusher.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Arc<Identity>) {
    let (sender, mut receiver) = socket.split();

    // The channel exists before registration so the initial activeUsers is buffered.
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = state.connect_participant_usecase.execute(identity, tx);

    let recv_state = state.clone();
    let recv_connection = connection.clone();

    // Inbound events of one connection are handled sequentially, in arrival order.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", recv_connection.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&recv_state, &recv_connection, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection.id);
                    break;
                }
                // Ping/pong is handled by the transport; binary frames are ignored.
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_participant_usecase.execute(&connection);
}
