//! Channel selection and HLS file serving.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};
use tunerhls_core::segments::{content_type, PLAYLIST_CONTENT_TYPE};
use tunerhls_core::{ChannelId, SessionStatus};

use super::error::{error_response, segment_error, session_error};
use crate::metrics::BYTES_SERVED;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub stopped: bool,
    /// Whether a transcoder was actually running.
    pub was_running: bool,
}

/// GET /channel/{id}
///
/// Start (or reuse) the transcoder for a channel and redirect to its
/// playlist once it exists. Blocks until the playlist appears.
pub async fn request_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let channel: ChannelId = match id.parse() {
        Ok(channel) => channel,
        Err(e) => return error_response(StatusCode::NOT_FOUND, e.to_string()),
    };

    match state.sessions().request_channel(&channel).await {
        Ok(target) => (
            StatusCode::FOUND,
            [(header::LOCATION, target.as_str().to_string())],
        )
            .into_response(),
        Err(e) => {
            error!("Request for channel {} failed: {}", channel, e);
            session_error(&e)
        }
    }
}

/// GET /stream/{*file}
///
/// Serve a playlist or segment from the segment directory. Only the final
/// path component of `file` is used.
pub async fn stream_file(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    let sessions = state.sessions();

    match sessions.store().read(&file).await {
        Ok(bytes) => {
            sessions.touch();

            let mime = content_type(&file);
            let kind = if mime == PLAYLIST_CONTENT_TYPE {
                "playlist"
            } else {
                "segment"
            };
            BYTES_SERVED
                .with_label_values(&[kind])
                .inc_by(bytes.len() as u64);

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            debug!("Cannot serve {}: {}", file, e);
            segment_error(&e)
        }
    }
}

/// GET /stop
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    let stopped = state.sessions().stop_current().await;
    Json(StopResponse {
        stopped: true,
        was_running: stopped.was_running,
    })
}

/// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.sessions().status().await)
}
