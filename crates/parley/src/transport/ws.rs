// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket handler: one authenticated session per connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::Identity;
use crate::dispatch;
use crate::protocol::ServerEvent;
use crate::session::registry::SessionHandle;
use crate::signal::relay;
use crate::state::AppState;
use crate::transport::auth;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// `GET /ws`: authenticate the handshake, then upgrade.
///
/// A failed handshake is refused with 401 before any session exists.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let identity = match auth::identify(&state, query.token.as_deref(), &headers) {
        Ok(identity) => identity,
        Err(e) => {
            debug!("refusing websocket handshake: {e}");
            return auth::unauthorized(&e);
        }
    };

    ws.on_upgrade(move |socket| handle_connection(state, identity, socket)).into_response()
}

/// Per-connection event loop.
async fn handle_connection(state: Arc<AppState>, identity: Identity, socket: WebSocket) {
    let user_id = identity.user_id;
    let (handle, mut events_rx) = SessionHandle::channel();
    let conn_id = handle.conn_id();
    let closed = handle.closed_token();
    if let Some(old) = state.hub.connect(&user_id, handle) {
        // The new connection starts with no call state.
        let ended = relay::end_calls_for(&state, &user_id);
        debug!(user_id = %user_id, %old, ended, "ended calls of superseded session");
    }

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            _ = closed.cancelled() => {
                debug!(user_id = %user_id, %conn_id, "session superseded");
                break;
            }
            _ = state.shutdown.cancelled() => break,

            event = events_rx.recv() => {
                let Some(event) = event else { break };
                if send_json(&mut ws_tx, &event).await.is_err() {
                    break;
                }
            }

            msg = ws_rx.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(_)) | None => break,
                };

                match msg {
                    Message::Text(text) => {
                        if let Some(reply) = dispatch::handle_frame(&state, &user_id, &text).await {
                            if send_json(&mut ws_tx, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    }

    let _ = ws_tx.close().await;

    if state.hub.disconnect(&user_id, conn_id) {
        relay::end_calls_for(&state, &user_id);
    }
}

/// Send a JSON-serialized event over the WebSocket.
async fn send_json<S>(tx: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let text = match serde_json::to_string(event) {
        Ok(t) => t,
        Err(e) => {
            warn!("failed to serialize event: {e}");
            return Err(());
        }
    };
    tx.send(Message::Text(text.into())).await.map_err(|_| ())
}
