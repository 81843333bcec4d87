// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chat::delivery::CreationLocks;
use crate::chat::store::ChatStore;
use crate::config::ParleyConfig;
use crate::media::MediaTokenIssuer;
use crate::session::hub::Hub;
use crate::signal::calls::CallTracker;

/// Shared broker state, one per process.
pub struct AppState {
    pub config: ParleyConfig,
    pub hub: Hub,
    pub store: Arc<dyn ChatStore>,
    pub calls: CallTracker,
    /// Serializes conversation creation per (workspace, pair).
    pub creation_locks: CreationLocks,
    pub media: MediaTokenIssuer,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ParleyConfig, store: Arc<dyn ChatStore>, shutdown: CancellationToken) -> Self {
        let media = MediaTokenIssuer::new(
            config.media_api_key.clone(),
            config.media_api_secret.clone(),
            config.media_token_ttl(),
        );
        Self {
            config,
            hub: Hub::new(),
            store,
            calls: CallTracker::new(),
            creation_locks: CreationLocks::new(),
            media,
            shutdown,
        }
    }

    pub fn jwt_secret(&self) -> &[u8] {
        self.config.jwt_secret.as_bytes()
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Return current epoch seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
