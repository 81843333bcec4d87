// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Room access tokens for the media server.
//!
//! Tokens are HS256 JWTs signed with the media server's API secret. The
//! API key is the issuer; the participant identity is the subject.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::jwt::{self, JwtError};
use crate::error::ErrorCode;

/// Room permissions granted by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaClaims {
    pub iss: String,
    pub sub: String,
    pub nbf: u64,
    pub exp: u64,
    pub video: VideoGrant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTokenError {
    MissingRoom,
    MissingParticipant,
    NotConfigured,
    Sign(JwtError),
}

impl MediaTokenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingRoom | Self::MissingParticipant => ErrorCode::BadRequest,
            Self::NotConfigured => ErrorCode::MediaNotConfigured,
            Self::Sign(_) => ErrorCode::Internal,
        }
    }
}

impl fmt::Display for MediaTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoom => f.write_str("room name is required"),
            Self::MissingParticipant => f.write_str("participant name is required"),
            Self::NotConfigured => f.write_str("media server credentials are not configured"),
            Self::Sign(err) => write!(f, "failed to sign media token: {err}"),
        }
    }
}

impl std::error::Error for MediaTokenError {}

struct Credentials {
    api_key: String,
    api_secret: String,
}

pub struct MediaTokenIssuer {
    credentials: Option<Credentials>,
    ttl: Duration,
}

impl MediaTokenIssuer {
    /// Build an issuer. Missing key or secret leaves it unconfigured; every
    /// request then fails with [`MediaTokenError::NotConfigured`].
    pub fn new(api_key: Option<String>, api_secret: Option<String>, ttl: Duration) -> Self {
        let credentials = match (api_key, api_secret) {
            (Some(api_key), Some(api_secret)) if !api_key.is_empty() && !api_secret.is_empty() => {
                Some(Credentials { api_key, api_secret })
            }
            _ => None,
        };
        Self { credentials, ttl }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Build the claims for `participant` joining `room` at `now` (epoch seconds).
    pub fn claims(
        &self,
        room: &str,
        participant: &str,
        now: u64,
    ) -> Result<MediaClaims, MediaTokenError> {
        let room = room.trim();
        let participant = participant.trim();
        if room.is_empty() {
            return Err(MediaTokenError::MissingRoom);
        }
        if participant.is_empty() {
            return Err(MediaTokenError::MissingParticipant);
        }
        let creds = self.credentials.as_ref().ok_or(MediaTokenError::NotConfigured)?;

        Ok(MediaClaims {
            iss: creds.api_key.clone(),
            sub: participant.to_owned(),
            nbf: now,
            exp: now.saturating_add(self.ttl.as_secs()),
            video: VideoGrant {
                room: room.to_owned(),
                room_join: true,
                can_publish: true,
                can_subscribe: true,
            },
        })
    }

    /// Mint a signed room token.
    pub fn issue(&self, room: &str, participant: &str, now: u64) -> Result<String, MediaTokenError> {
        let claims = self.claims(room, participant, now)?;
        let creds = self.credentials.as_ref().ok_or(MediaTokenError::NotConfigured)?;
        jwt::encode_hs256(&claims, creds.api_secret.as_bytes()).map_err(MediaTokenError::Sign)
    }
}
