//! JSON error bodies and the status codes core errors map to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tunerhls_core::{ChannelListError, SegmentError, SessionError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code, repeated for clients that only see the body.
    pub code: u16,
    pub message: String,
}

/// Build a `(status, json)` error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            message: message.into(),
        }),
    )
        .into_response()
}

pub fn session_error(e: &SessionError) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn segment_error(e: &SegmentError) -> Response {
    if e.is_not_found() {
        error_response(StatusCode::NOT_FOUND, e.to_string())
    } else {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub fn channel_list_error(e: &ChannelListError) -> Response {
    error_response(StatusCode::BAD_GATEWAY, e.to_string())
}
