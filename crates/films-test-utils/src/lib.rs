//! # Films Test Utilities
//!
//! Shared test utilities for the Films API.
//!
//! This crate provides:
//! - Server test harness (`TestFilmsServer` for E2E tests over HTTP)
//! - Token builders for hand-crafted, expired or forged bearer tokens
//!
//! ## Usage
//!
//! ```rust,ignore
//! use films_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestFilmsServer::spawn_seeded().await?;
//!     let token = server.login("test1", SEED_PASSWORD).await?;
//!
//!     let forged = TestTokenBuilder::new().for_user(1).signed_with("wrong").build();
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod token_builders;

pub use films_api::services::seed::{SEED_OWNER, SEED_PASSWORD};
pub use server_harness::*;
pub use token_builders::*;
