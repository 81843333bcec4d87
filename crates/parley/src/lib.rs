// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parley: real-time chat and call-signaling broker.

pub mod auth;
pub mod chat;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod media;
pub mod protocol;
pub mod session;
pub mod signal;
pub mod state;
pub mod test_support;
pub mod transport;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::chat::memory::MemoryStore;
use crate::chat::model::UserProfile;
use crate::config::ParleyConfig;
use crate::state::AppState;
use crate::transport::build_router;

/// Read the seed profiles file: a JSON array of [`UserProfile`].
pub fn load_users(path: &Path) -> anyhow::Result<Vec<UserProfile>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading users file {}", path.display()))?;
    let users = serde_json::from_str(&contents)
        .with_context(|| format!("parsing users file {}", path.display()))?;
    Ok(users)
}

/// Run the broker until shutdown.
pub async fn run(config: ParleyConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let users = match config.users_file {
        Some(ref path) => load_users(path)?,
        None => vec![],
    };
    let user_count = users.len();
    let store = Arc::new(MemoryStore::with_users(users));

    if config.media_api_key.is_none() {
        tracing::info!("media tokens disabled (no API key configured)");
    }

    let state = Arc::new(AppState::new(config, store, shutdown.clone()));
    let router = build_router(state);

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
        });
    }

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(users = user_count, "parley listening on {addr}");
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
