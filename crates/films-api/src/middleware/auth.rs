//! Authentication and authorization middleware.
//!
//! - `authenticate` runs on every request and attaches an [`AuthContext`]
//! - `require_authentication` is a route layer on protected routes
//!
//! A request without a usable `Authorization` header is anonymous, not an
//! error; public routes must still be reachable. A header carrying a bad
//! token is always rejected.

use crate::auth::{extract_token, AuthContext, InvalidReason, TokenError, TokenService};
use crate::errors::ApiError;
use crate::observability::metrics::record_token_validation;
use crate::repositories::UserRepository;
use axum::{
    extract::{Request, State},
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserRepository>,
}

/// Resolve the caller's identity and attach it to the request.
///
/// # Response
///
/// - 400 if the token is authentic but its claims are malformed
/// - 401 if the token is expired, forged or otherwise invalid
/// - 500 if the user store fails
/// - Otherwise continues with an `AuthContext` in extensions
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = resolve_context(&state, req.headers()).await?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

#[instrument(skip_all, name = "films.middleware.authenticate")]
async fn resolve_context(state: &AuthState, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
    let token = match extract_token(headers) {
        Ok(token) => token,
        Err(e) => {
            tracing::trace!(target: "films.middleware.auth", reason = %e, "No bearer token, continuing anonymously");
            return Ok(AuthContext::Anonymous);
        }
    };

    let user_id = match state.tokens.verify_token(token) {
        Ok(user_id) => {
            record_token_validation("valid");
            user_id
        }
        Err(e) => {
            record_token_validation(match e {
                TokenError::TokenExpired => "expired",
                TokenError::InvalidToken(InvalidReason::ClaimShape) => "claim_shape",
                _ => "invalid",
            });
            tracing::debug!(target: "films.middleware.auth", error = %e, "Rejecting request with bad token");
            return Err(e.into());
        }
    };

    if !state.users.exists(user_id).await? {
        // Token is authentic but its user is gone.
        tracing::warn!(
            target: "films.middleware.auth",
            user_id = %user_id,
            "Valid token references a missing user, continuing anonymously"
        );
        return Ok(AuthContext::Anonymous);
    }

    Ok(AuthContext::Authenticated { user_id })
}

/// Reject anonymous requests before they reach the handler.
///
/// Successful responses are marked `Cache-Control: no-store`.
pub async fn require_authentication(req: Request, next: Next) -> Result<Response, ApiError> {
    let authenticated = req
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if !authenticated {
        return Err(ApiError::NotAuthenticated);
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}
