//! Bearer token issue, verification and extraction.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret loaded at
//! startup. They are self-contained: verification needs no storage and
//! no coordination, so one [`TokenService`] is shared by every request.
//!
//! # Verification order
//!
//! 1. Size, format and signature (`InvalidToken(Integrity)`)
//! 2. Expiry: a token is valid only strictly before `exp` (`TokenExpired`)
//! 3. Claim shape: `exp` and `sub` must be integers (`InvalidToken(ClaimShape)`)

use crate::models::UserId;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::instrument;

/// Token lifetime (24 hours).
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Maximum accepted token size in bytes, checked before any parsing.
const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Not a JWT, wrong algorithm, bad signature or oversized.
    Integrity,
    /// Authentic token whose claims lack a well-typed `sub` or `exp`.
    ClaimShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Authorization header is missing")]
    MissingAuthHeader,

    #[error("Authorization header does not have the correct formatting")]
    MalformedAuthHeader,

    #[error("access token is invalid")]
    InvalidToken(InvalidReason),

    #[error("access token has expired")]
    TokenExpired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Credential claim carried by a bearer token.
///
/// The `sub` field identifies the user and is redacted from Debug output.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Issues and verifies bearer tokens with a single process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        // Expiry and claim shape are checked here rather than by jsonwebtoken
        // so the order of failures and the clock are under our control.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for [`TOKEN_TTL_SECONDS`] from now.
    pub fn issue_token(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_token_at(user_id, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    #[instrument(skip_all)]
    pub fn issue_token_at(&self, user_id: UserId, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.0,
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against the current time and return its subject.
    pub fn verify_token(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_token_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (unix seconds).
    #[instrument(skip_all)]
    pub fn verify_token_at(&self, token: &str, now: i64) -> Result<UserId, TokenError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(
                target: "films.auth.token",
                token_size = token.len(),
                max_size = MAX_TOKEN_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(TokenError::InvalidToken(InvalidReason::Integrity));
        }

        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(target: "films.auth.token", error = %e, "Token verification failed");
                TokenError::InvalidToken(InvalidReason::Integrity)
            })?;
        let claims = data.claims;

        let exp = claims.get("exp").and_then(Value::as_i64).ok_or_else(|| {
            tracing::debug!(target: "films.auth.token", "Token rejected: missing or ill-typed exp");
            TokenError::InvalidToken(InvalidReason::ClaimShape)
        })?;

        if now >= exp {
            tracing::debug!(target: "films.auth.token", exp = exp, now = now, "Token expired");
            return Err(TokenError::TokenExpired);
        }

        let sub = claims.get("sub").and_then(Value::as_i64).ok_or_else(|| {
            tracing::debug!(target: "films.auth.token", "Token rejected: missing or ill-typed sub");
            TokenError::InvalidToken(InvalidReason::ClaimShape)
        })?;

        Ok(UserId(sub))
    }
}

/// Extract the bearer token from an `Authorization: Bearer <token>` header.
///
/// The scheme is case-insensitive and must be followed by exactly one space.
/// An empty token after the space is returned as is and fails verification.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| TokenError::MalformedAuthHeader)?;

    if value.is_empty() {
        return Err(TokenError::MissingAuthHeader);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(TokenError::MalformedAuthHeader),
    }
}
