//! Films API Service Library
//!
//! A CRUD HTTP backend for movies, users and per-user favourites. The
//! request authentication and validation core lives here: bearer token
//! issue/verify/extract, the middleware pipeline that resolves a
//! per-request [`auth::AuthContext`], and the field-level
//! [`validation::Validator`] used by every write endpoint.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - Bearer tokens and the per-request authentication context
//! - `config` - Service configuration from environment
//! - `crypto` - Password hashing
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Request pipeline layers
//! - `models` - Data models
//! - `observability` - Metrics
//! - `repositories` - Storage access layer
//! - `routes` - Axum router and pipeline composition
//! - `services` - Business logic layer
//! - `validation` - Field validation accumulator and predicates

pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;
