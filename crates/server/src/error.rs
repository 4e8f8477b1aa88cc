//! Mapping from coordinator errors to HTTP responses.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use offramp_core::Error;

/// Build a plain-text response with the given status.
pub fn plain(status: StatusCode, message: &str) -> Response {
    let mut response = Response::new(Body::from(message.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Translate a propagated coordinator error into the host's failure signal.
///
/// Network failure on the propagate paths (cache-first double miss,
/// pass-through double miss) is the browser-facing "your network is down"
/// case: 502.
pub fn into_response(err: &Error) -> Response {
    let (status, message) = match err {
        Error::Network(_) => (StatusCode::BAD_GATEWAY, "origin unreachable"),
        Error::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "bad request"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    };
    tracing::warn!(error = %err, status = %status, "request failed");
    plain(status, message)
}
