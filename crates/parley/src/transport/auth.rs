// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::auth::{self, AuthError, Identity};
use crate::state::{epoch_secs, AppState};

/// Authenticate a request or handshake from its explicit token parameter,
/// headers, and cookies.
pub fn identify(
    state: &AppState,
    explicit: Option<&str>,
    headers: &HeaderMap,
) -> Result<Identity, AuthError> {
    let token = auth::extract_token(explicit, headers, &state.config.auth_cookie);
    auth::authenticate(token.as_deref(), state.jwt_secret(), epoch_secs())
}

pub fn unauthorized(err: &AuthError) -> Response {
    err.code().to_http_response(err.to_string()).into_response()
}

/// Axum middleware that authenticates API requests and attaches the
/// caller's [`Identity`] as a request extension.
///
/// Exempt: `/api/v1/health` and the WebSocket upgrade (`/ws`), which
/// authenticates its own handshake.
pub async fn auth_layer(
    state: State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == "/api/v1/health" || path == "/ws" {
        return next.run(req).await;
    }

    match identify(&state, None, req.headers()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            debug!(path = %req.uri().path(), "{e}");
            unauthorized(&e)
        }
    }
}
