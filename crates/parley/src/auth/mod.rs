// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection authentication: locate the bearer credential on a handshake
//! and turn it into a verified [`Identity`].

pub mod jwt;

use std::fmt;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::JwtError;
use crate::error::ErrorCode;

/// Claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiry, epoch seconds. Tokens without `exp` never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// Authenticated principal attached to a connection or request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    Invalid(JwtError),
    Expired,
    NotYetValid,
    MissingIdentity,
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Unauthorized
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => f.write_str("authentication error: token not provided"),
            Self::Invalid(err) => write!(f, "authentication error: invalid token ({err})"),
            Self::Expired => f.write_str("authentication error: token expired"),
            Self::NotYetValid => f.write_str("authentication error: token not yet valid"),
            Self::MissingIdentity => f.write_str("authentication error: token has no user id"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        Self::Invalid(err)
    }
}

/// Find the access token for a handshake.
///
/// Sources in priority order: the explicit connection parameter (`?token=`),
/// an `Authorization: Bearer` header, then the named cookie.
pub fn extract_token(
    explicit: Option<&str>,
    headers: &HeaderMap,
    cookie_name: &str,
) -> Option<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_owned());
    }
    if let Some(token) = bearer_token(headers) {
        return Some(token.to_owned());
    }
    cookie_value(headers, cookie_name)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Look up a cookie by name across every `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

/// Verify a token and check its time window against `now` (epoch seconds).
pub fn authenticate(token: Option<&str>, secret: &[u8], now: u64) -> Result<Identity, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;
    let claims: Claims = jwt::decode_hs256(token, secret)?;

    if claims.exp.is_some_and(|exp| now >= exp) {
        return Err(AuthError::Expired);
    }
    if claims.nbf.is_some_and(|nbf| now < nbf) {
        return Err(AuthError::NotYetValid);
    }
    if claims.user_id.trim().is_empty() {
        return Err(AuthError::MissingIdentity);
    }

    Ok(Identity { user_id: claims.user_id, name: claims.name })
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
