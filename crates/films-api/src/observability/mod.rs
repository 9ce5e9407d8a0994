//! Observability for the Films API: metrics definitions and recording helpers.
//!
//! Logging is plain `tracing`; the subscriber is installed in `main`.

pub mod metrics;
