//! Per-request authentication context.

use crate::errors::ApiError;
use crate::models::UserId;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Who is making the request.
///
/// Exactly one value is attached to every request by the authenticate
/// middleware and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthContext {
    #[default]
    Anonymous,
    Authenticated { user_id: UserId },
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            AuthContext::Authenticated { user_id } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }
}

/// Reads the context attached by the authenticate middleware.
///
/// Missing context is treated as anonymous.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .unwrap_or_default())
    }
}

/// Extractor for handlers behind the authentication guard.
///
/// Rejects with 401 if the request is anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::user_id)
            .map(AuthenticatedUser)
            .ok_or(ApiError::NotAuthenticated)
    }
}
