//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the gateway:
//! - HTTP request metrics (latency, counts, in flight)
//! - Bytes of playlists and segments served
//! - Session state (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

use tunerhls_core::SessionState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tunerhls_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tunerhls_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tunerhls_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Stream Metrics
// =============================================================================

/// Bytes served from the segment directory, by file kind.
pub static BYTES_SERVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tunerhls_stream_bytes_served_total",
            "Bytes of playlists and segments served",
        ),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Session Metrics (collected dynamically)
// =============================================================================

/// Whether a transcoder is running (1) or not (0).
pub static SESSION_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tunerhls_session_active",
        "Whether a transcoder is currently running (1) or not (0)",
    )
    .unwrap()
});

/// Current session state, 1 for the active state label and 0 for the rest.
pub static SESSION_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("tunerhls_session_state", "Current session state"),
        &["state"],
    )
    .unwrap()
});

/// Seconds since the last client activity.
pub static SESSION_IDLE_SECONDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tunerhls_session_idle_seconds",
        "Seconds since the session was last accessed",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Stream
    registry.register(Box::new(BYTES_SERVED.clone())).unwrap();

    // Session
    registry.register(Box::new(SESSION_ACTIVE.clone())).unwrap();
    registry.register(Box::new(SESSION_STATE.clone())).unwrap();
    registry
        .register(Box::new(SESSION_IDLE_SECONDS.clone()))
        .unwrap();

    // Core metrics (transcoder, segments, tuner)
    for metric in tunerhls_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the session gauges reflect the current values.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.sessions().status().await;
    let active = status.pid.is_some() && status.state != SessionState::Idle;
    SESSION_ACTIVE.set(if active { 1 } else { 0 });
    SESSION_IDLE_SECONDS.set(status.idle_secs as i64);
    for state in SessionState::ALL {
        SESSION_STATE
            .with_label_values(&[state.as_str()])
            .set(if state == status.state { 1 } else { 0 });
    }
}

static STREAM_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/stream/.+$").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs and file names with
/// placeholders).
pub fn normalize_path(path: &str) -> String {
    if STREAM_FILE.is_match(path) {
        return "/stream/{file}".to_string();
    }
    NUMERIC_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
