//! Middleware for the Films API.
//!
//! # Components
//!
//! - `recover` - Panic isolation (outermost)
//! - `request_logger` - Inbound log line and per-request span
//! - `auth` - Authentication context resolution and the route guard
//! - `response_logger` - Outbound log line and HTTP metrics
//!
//! Composition order is fixed in [`crate::routes::with_pipeline`].

pub mod auth;
pub mod recover;
pub mod request_logger;
pub mod response_logger;

pub use auth::{authenticate, require_authentication, AuthState};
pub use recover::recover_panic;
pub use request_logger::log_request;
pub use response_logger::{log_response, LoggingBody};
