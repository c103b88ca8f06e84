//! Local inspection of the bearer token's claims segment.
//!
//! The token is opaque to the client except for its self-describing expiry:
//! the middle JWT segment is base64url-decoded and the `exp` claim compared
//! against the current time, without any network round-trip and without
//! signature verification (validity is the server's job).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenPeekError {
    #[error("token is not a three-segment JWT")]
    Shape,
    #[error("claims segment is not valid base64url")]
    Encoding,
    #[error("claims segment is not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry as seconds since the Unix epoch. Tokens without it are rejected.
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

pub fn peek_claims(token: &str) -> Result<TokenClaims, TokenPeekError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(claims), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenPeekError::Shape);
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(claims.as_bytes())
        .map_err(|_| TokenPeekError::Encoding)?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// Whether a persisted token is still worth presenting to the server.
/// Malformed tokens count as dead: they are discarded, not reported.
pub fn is_live(token: &str, now: DateTime<Utc>) -> bool {
    peek_claims(token)
        .map(|claims| !claims.is_expired(now))
        .unwrap_or(false)
}
