//! Inbound request logging.
//!
//! Opens the per-request span; every log line emitted further down the
//! pipeline (authentication, handlers, errors, the response log) carries
//! its method, URI and client address.

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::Instrument;

/// Client address from the connection, or `-` when serving without one
/// (e.g. in-process tests).
pub(crate) fn client_addr(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Log `CLIENT -> API` and run the rest of the pipeline inside the request span.
pub async fn log_request(req: Request, next: Next) -> Response {
    let addr = client_addr(&req);
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        addr = %addr,
    );

    async move {
        tracing::info!(
            target: "films.http",
            addr = %addr,
            proto = ?req.version(),
            method = %req.method(),
            uri = %req.uri(),
            "CLIENT -> API"
        );
        next.run(req).await
    }
    .instrument(span)
    .await
}
