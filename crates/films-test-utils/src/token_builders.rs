//! Builder for hand-crafted bearer tokens
//!
//! Produces tokens the service would never issue itself: expired, signed
//! with another secret or algorithm, or carrying ill-shaped claims.

use crate::server_harness::TEST_JWT_SECRET;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

/// Builder for test bearer tokens
///
/// # Example
/// ```rust,ignore
/// let expired = TestTokenBuilder::new()
///     .for_user(1)
///     .expires_in(-60)
///     .build();
///
/// let wrong_shape = TestTokenBuilder::new()
///     .with_claim("sub", json!("alice"))
///     .build();
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    secret: String,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Claims for user 1, valid for an hour, signed with [`TEST_JWT_SECRET`].
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::from(1));
        claims.insert("iat".to_string(), Value::from(now));
        claims.insert("exp".to_string(), Value::from(now + 3600));
        Self {
            claims,
            secret: TEST_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set a numeric subject
    pub fn for_user(self, user_id: i64) -> Self {
        self.with_claim("sub", Value::from(user_id))
    }

    /// Set expiration in seconds from now. Negative values give an expired token.
    pub fn expires_in(self, seconds: i64) -> Self {
        self.with_claim("exp", Value::from(Utc::now().timestamp() + seconds))
    }

    /// Set or replace an arbitrary claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim entirely
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Encode and sign the token
    pub fn build(self) -> String {
        encode(
            &Header::new(self.algorithm),
            &self.claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("HMAC token encoding should not fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
