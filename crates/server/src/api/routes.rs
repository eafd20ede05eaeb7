use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{channels, handlers, middleware::metrics_middleware, stream};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Streaming
        .route("/channel/{id}", get(stream::request_channel))
        .route("/stream/{*file}", get(stream::stream_file))
        .route("/stop", get(stream::stop))
        .route("/status", get(stream::status))
        // Tuner channel list
        .route("/channels", get(channels::list_channels))
        .route("/playlist.m3u", get(channels::playlist))
        // Operations
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
