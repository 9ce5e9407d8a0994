//! Outbound response logging.
//!
//! The response body is wrapped in [`LoggingBody`], which counts bytes as
//! frames are forwarded and emits `CLIENT <- API` once the body is dropped,
//! i.e. after it was fully written or the client went away. Status and
//! size are therefore those of the response actually sent, including guard
//! rejections produced inside the router.

use crate::auth::AuthContext;
use crate::observability::metrics::record_http_request;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, StatusCode, Uri, Version},
    middleware::Next,
    response::Response,
};
use http_body::{Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tracing::Span;

use super::request_logger::client_addr;

struct Exchange {
    addr: String,
    proto: Version,
    method: Method,
    uri: Uri,
    status: StatusCode,
    user: String,
    start: Instant,
}

/// Response body decorator that records size and logs on completion.
pub struct LoggingBody {
    inner: Body,
    bytes: u64,
    exchange: Exchange,
    span: Span,
}

impl http_body::Body for LoggingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                this.bytes += data.len() as u64;
            }
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for LoggingBody {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        let duration = self.exchange.start.elapsed();

        tracing::info!(
            target: "films.http",
            addr = %self.exchange.addr,
            proto = ?self.exchange.proto,
            method = %self.exchange.method,
            uri = %self.exchange.uri,
            status = self.exchange.status.as_u16(),
            size = self.bytes,
            duration_ms = duration.as_millis() as u64,
            user_id = %self.exchange.user,
            "CLIENT <- API"
        );

        record_http_request(
            self.exchange.method.as_str(),
            self.exchange.uri.path(),
            self.exchange.status.as_u16(),
            duration,
        );
    }
}

/// Wrap the response body so the exchange is logged once it completes.
pub async fn log_response(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let addr = client_addr(&req);
    let proto = req.version();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user = req
        .extensions()
        .get::<AuthContext>()
        .and_then(AuthContext::user_id)
        .map_or_else(|| "-".to_string(), |id| id.to_string());

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    let body = LoggingBody {
        inner: body,
        bytes: 0,
        exchange: Exchange {
            addr,
            proto,
            method,
            uri,
            status: parts.status,
            user,
            start,
        },
        span: Span::current(),
    };

    Response::from_parts(parts, Body::new(body))
}
