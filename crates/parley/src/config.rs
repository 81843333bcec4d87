// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Real-time chat and call-signaling broker.
#[derive(Debug, Clone, Parser)]
#[command(name = "parley", version, about)]
pub struct ParleyConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "PARLEY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8400, env = "PARLEY_PORT")]
    pub port: u16,

    /// Shared secret used to verify HS256 access tokens.
    #[arg(long, env = "PARLEY_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Cookie consulted for the access token when the handshake carries
    /// neither a `token` parameter nor an Authorization header.
    #[arg(long, default_value = "jwt", env = "PARLEY_AUTH_COOKIE")]
    pub auth_cookie: String,

    /// API key for media room tokens. Media tokens are disabled if unset.
    #[arg(long, env = "PARLEY_MEDIA_API_KEY")]
    pub media_api_key: Option<String>,

    /// API secret for media room tokens.
    #[arg(long, env = "PARLEY_MEDIA_API_SECRET", hide_env_values = true)]
    pub media_api_secret: Option<String>,

    /// Lifetime of issued media tokens in seconds.
    #[arg(long, default_value_t = 3600, env = "PARLEY_MEDIA_TOKEN_TTL_SECS")]
    pub media_token_ttl_secs: u64,

    /// JSON file with an array of user profiles to seed the store.
    #[arg(long, env = "PARLEY_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "PARLEY_LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "PARLEY_LOG_LEVEL")]
    pub log_level: String,
}

impl ParleyConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("--jwt-secret must not be empty");
        }
        if self.auth_cookie.trim().is_empty() {
            anyhow::bail!("--auth-cookie must not be empty");
        }
        match (&self.media_api_key, &self.media_api_secret) {
            (Some(_), None) => anyhow::bail!("--media-api-key requires --media-api-secret"),
            (None, Some(_)) => anyhow::bail!("--media-api-secret requires --media-api-key"),
            _ => {}
        }
        if self.media_token_ttl_secs == 0 {
            anyhow::bail!("--media-token-ttl-secs must be positive");
        }
        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => anyhow::bail!("invalid log format: {other}"),
        }
    }

    pub fn media_token_ttl(&self) -> Duration {
        Duration::from_secs(self.media_token_ttl_secs)
    }

    /// Build a minimal config for tests (port 0, fixed secret, no media).
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "test-jwt-secret".into(),
            auth_cookie: "jwt".into(),
            media_api_key: None,
            media_api_secret: None,
            media_token_ttl_secs: 3600,
            users_file: None,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
