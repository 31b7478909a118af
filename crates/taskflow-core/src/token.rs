//! Session token codec.
//!
//! Tokens are HS256-signed JWTs carrying a single subject (the user id as a
//! decimal string) plus issue and expiry timestamps:
//!
//! ```json
//! { "userID": "64", "iat": 1734630770, "exp": 1734631670 }
//! ```
//!
//! The codec is pure computation. Callers always pass the secret explicitly;
//! access and refresh tokens are signed with different [`TokenSecret`]s so
//! that one can never be verified as the other.
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use taskflow_core::token::{issue_token, verify_token, TokenSecret};
//!
//! let secret = TokenSecret::from("access-secret");
//! let token = issue_token("42", &secret, Duration::minutes(15)).unwrap();
//! let claims = verify_token(&token, &secret).unwrap();
//! assert_eq!(claims.subject, "42");
//! ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signing algorithm for every session token.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim set embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's id as a string.
    #[serde(rename = "userID")]
    pub subject: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// HMAC key material for signing and verifying tokens.
///
/// `Debug` output never contains the key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True if no key material is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TokenSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for TokenSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret({} bytes)", self.0.len())
    }
}

/// Token issuance and verification failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature or algorithm does not match the expected key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Subject or expiry claim is missing or has the wrong type.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Expiry claim is not in the future.
    #[error("token expired")]
    Expired,

    /// Input is not a well-formed JWT.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token could not be signed. Indicates key misconfiguration.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// `now + ttl` is outside the representable time range.
    #[error("token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Sign a new token for `subject` that expires `ttl` from now.
///
/// A negative `ttl` yields a token that is already expired.
pub fn issue_token(subject: &str, secret: &TokenSecret, ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now();
    let expires = now
        .checked_add_signed(ttl)
        .ok_or(TokenError::LifetimeOutOfRange)?;
    let claims = Claims {
        subject: subject.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Check the signature of `token` under `secret` and return its claims.
pub fn verify_token(token: &str, secret: &TokenSecret) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    // Expiry is checked below with no leeway.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(classify)?;

    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(data.claims)
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::Json(e) => TokenError::InvalidClaims(e.to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            TokenError::InvalidClaims(format!("missing claim `{}`", claim))
        }
        _ => TokenError::Malformed(err.to_string()),
    }
}
