use crate::config::Config;
use crate::error::AppError;
use actix_web::http::header::HeaderValue;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

/// Why a bearer token was rejected. Each kind has its own code and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No `Authorization` header.
    Missing,
    /// Wrong scheme, undecodable, or bad signature.
    Malformed(String),
    Expired,
    /// Issued before the configured revocation cut-off.
    Revoked,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Missing => "token_missing",
            TokenError::Malformed(_) => "token_invalid",
            TokenError::Expired => "token_expired",
            TokenError::Revoked => "token_revoked",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TokenError::Missing => "Request does not contain an access token",
            TokenError::Malformed(_) => "Signature verification failed",
            TokenError::Expired => "The token has expired",
            TokenError::Revoked => "The token has been revoked",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            TokenError::Missing => {
                "Send an 'Authorization: Bearer <token>' header with a token from POST /auth/login."
            }
            TokenError::Malformed(_) => {
                "Check that the whole token is sent after 'Bearer ', or log in again."
            }
            TokenError::Expired => "Log in again to obtain a fresh token.",
            TokenError::Revoked => "This token is no longer accepted. Log in again.",
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed(detail) => write!(f, "{}: {}", self.message(), detail),
            _ => f.write_str(self.message()),
        }
    }
}

/// Issues and verifies HS256 access tokens.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    revoked_before: Option<i64>,
}

impl TokenManager {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            ttl,
            revoked_before: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl)
            .with_revocation_cutoff(config.token_revoked_before)
    }

    /// Tokens issued strictly before `cutoff` (unix seconds) are rejected as revoked.
    pub fn with_revocation_cutoff(mut self, cutoff: Option<i64>) -> Self {
        self.revoked_before = cutoff;
        self
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Generates a token for `user_id`, valid for the configured lifetime.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("token expiry overflow".into()))?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry, then the revocation cut-off.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        match self.revoked_before {
            Some(cutoff) if claims.iat < cutoff => Err(TokenError::Revoked),
            _ => Ok(claims),
        }
    }

    /// Extracts and verifies the token from an `Authorization: Bearer <token>` header.
    pub fn verify_header(&self, header: Option<&HeaderValue>) -> Result<Claims, TokenError> {
        let header = header.ok_or(TokenError::Missing)?;
        let value = header
            .to_str()
            .map_err(|_| TokenError::Malformed("header is not valid ASCII".into()))?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TokenError::Malformed("expected 'Bearer <token>'".into()))?;
        self.verify(token)
    }
}
