// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HS256 JSON Web Tokens on top of `jsonwebtoken`.

use std::fmt;

use jsonwebtoken::errors::{Error as JwtLibError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// Not three base64url segments of JSON.
    Malformed,
    /// Header names an algorithm other than HS256.
    UnsupportedAlgorithm,
    /// Signature does not match the shared secret.
    BadSignature,
    /// Claims could not be serialized.
    Encode(String),
    Other(String),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed token"),
            Self::UnsupportedAlgorithm => f.write_str("unsupported algorithm"),
            Self::BadSignature => f.write_str("invalid signature"),
            Self::Encode(msg) => write!(f, "failed to encode claims: {msg}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for JwtError {}

impl From<JwtLibError> for JwtError {
    fn from(err: JwtLibError) -> Self {
        match err.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnsupportedAlgorithm
            }
            ErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Sign `claims` with HMAC-SHA256.
pub fn encode_hs256<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String, JwtError> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| JwtError::Encode(e.to_string()))
}

/// Verify the signature of an HS256 token and decode its claims.
///
/// Time-based claims are left to the caller, which checks them against its
/// own clock.
pub fn decode_hs256<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    let data = decode::<T>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
