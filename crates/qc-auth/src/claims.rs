//! Local, unverified reads of access-token claims.
//!
//! The console never verifies signatures; the identity service is the arbiter
//! of validity. These helpers only pull the subject id and expiry out of the
//! payload segment so `check_auth` knows which user to fetch.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::error::AuthError;

/// Claims read from the payload segment of a JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject user id (`sub`, falling back to `user_id`).
    pub subject: String,
    /// Expiry (`exp`), when present.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenClaims {
    /// Check if the token is expired or expires within `buffer_secs`.
    ///
    /// Tokens without `exp` are never considered near expiry.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= Utc::now() + TimeDelta::seconds(buffer_secs))
    }
}

/// Decode the payload of `jwt` without verifying its signature.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token does not have three
/// segments, the payload is not base64url JSON, or no subject claim exists.
pub fn decode(jwt: &str) -> Result<TokenClaims, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken("invalid JWT format".into()));
    }
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("base64 decode failed: {e}")))?;
    let value: Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::MalformedToken(format!("JSON parse failed: {e}")))?;

    let subject = claim_as_id(&value["sub"])
        .or_else(|| claim_as_id(&value["user_id"]))
        .ok_or_else(|| AuthError::MalformedToken("missing sub claim".into()))?;

    let expires_at = match &value["exp"] {
        Value::Null => None,
        exp => {
            let secs = exp
                .as_i64()
                .ok_or_else(|| AuthError::MalformedToken("exp claim is not an integer".into()))?;
            Some(
                DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| AuthError::MalformedToken("invalid exp timestamp".into()))?,
            )
        }
    };

    Ok(TokenClaims {
        subject,
        expires_at,
    })
}

/// Decode only the subject id.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_subject(jwt: &str) -> Result<String, AuthError> {
    decode(jwt).map(|claims| claims.subject)
}

fn claim_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
