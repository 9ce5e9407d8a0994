//! Business logic layer.

pub mod seed;
pub mod user_service;
