// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::Identity;
use crate::error::ErrorCode;
use crate::state::{epoch_secs, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub online_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTokenRequest {
    #[serde(default)]
    pub room_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MediaTokenResponse {
    pub token: String,
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), online_count: s.hub.online_count() })
}

/// `POST /api/v1/media/token`: mint a room token for the caller.
///
/// The participant is named after the caller's profile, falling back to
/// the `name` claim of their access token.
pub async fn media_token(
    State(s): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<MediaTokenRequest>,
) -> Response {
    let profile_name = match s.store.user(&identity.user_id).await {
        Ok(profile) => profile.map(|p| p.name),
        Err(e) => {
            error!(user_id = %identity.user_id, "profile lookup failed: {e}");
            return ErrorCode::Internal.to_http_response("profile lookup failed").into_response();
        }
    };
    let participant = profile_name.or(identity.name).unwrap_or_default();

    match s.media.issue(&req.room_name, &participant, epoch_secs()) {
        Ok(token) => {
            info!(user_id = %identity.user_id, room = %req.room_name, "media token issued");
            Json(MediaTokenResponse { token }).into_response()
        }
        Err(e) => e.code().to_http_response(e.to_string()).into_response(),
    }
}
