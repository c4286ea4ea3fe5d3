//! Request middleware.

use std::sync::Arc;

use axum::{extract::Request, middleware::Next, response::Response};

use http::{HeaderValue, header};

use crate::app::error::AppErrorKind;

/// Adds security headers to every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut res = next.run(request).await;

    res.headers_mut().extend([
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("frame-ancestors 'none'"),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ]);

    res
}

/// Logs internal errors attached to a response by [`AppError`].
///
/// [`AppError`]: crate::app::AppError
// Stolen from: https://github.com/tokio-rs/axum/blob/main/examples/error-handling/src/main.rs
pub async fn log_app_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    // If the response contains an AppErrorKind extension, log it.
    if let Some(err) = response.extensions().get::<Arc<AppErrorKind>>() {
        tracing::error!(?err, "an unexpected error occurred inside a handler");
    }
    response
}
