//! Panic isolation for the request pipeline.
//!
//! Outermost layer: a panic anywhere below it, including the logging and
//! authentication layers, becomes a 500 and the serving loop keeps going.

use axum::{
    extract::Request,
    http::{header::CONNECTION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;

/// Convert a panic in any inner layer into a 500 response.
///
/// The response carries `Connection: close` so a kept-alive connection is
/// not reused after the fault.
pub async fn recover_panic(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(
                target: "films.middleware.recover",
                method = %method,
                uri = %uri,
                panic = %panic_message(payload.as_ref()),
                backtrace = %Backtrace::force_capture(),
                "Recovered from panic while handling request"
            );

            let status = StatusCode::INTERNAL_SERVER_ERROR;
            let mut response =
                (status, status.canonical_reason().unwrap_or_default()).into_response();
            response
                .headers_mut()
                .insert(CONNECTION, HeaderValue::from_static("close"));
            response
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
