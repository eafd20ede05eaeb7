//! Tuner channel list endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tunerhls_core::M3uPlaylist;

use super::error::channel_list_error;
use crate::state::AppState;

/// GET /channels
///
/// Channels offered by the tuner, each with a direct and a transcoding URL.
pub async fn list_channels(State(state): State<Arc<AppState>>) -> Response {
    match state.channels().channels().await {
        Ok(channels) => Json(channels.as_ref().clone()).into_response(),
        Err(e) => channel_list_error(&e),
    }
}

/// GET /playlist.m3u
///
/// M3U playlist of all channels pointing at the transcoding URLs.
pub async fn playlist(State(state): State<Arc<AppState>>) -> Response {
    match state.channels().channels().await {
        Ok(channels) => {
            let playlist = channels.iter().collect::<M3uPlaylist>().ordered();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "audio/x-mpegurl")],
                playlist.to_string(),
            )
                .into_response()
        }
        Err(e) => channel_list_error(&e),
    }
}

