//! Bearer tokens and the per-request authentication context.

pub mod context;
pub mod token;

pub use context::{AuthContext, AuthenticatedUser};
pub use token::{extract_token, Claims, InvalidReason, TokenError, TokenService, TOKEN_TTL_SECONDS};
