pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use password::{hash_password, verify_password};

/// Session token claims; `sub` is the user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Fails when `expiry_hours` does not fit a timestamp
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, expiry_hours: u64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(AuthError::InvalidLifetime(expiry_hours))?;

        Ok(Self {
            sub: user_id.into(),
            email: email.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> u64 {
        u64::try_from(self.exp - self.iat).unwrap_or(0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    MissingToken(&'static str),

    #[error("Session lifetime of {0} hours is out of range")]
    InvalidLifetime(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}
