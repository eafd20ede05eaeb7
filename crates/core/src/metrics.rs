//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Transcoder lifecycle (starts, failures, stops)
//! - Channel readiness waits
//! - Segment cleanup
//! - Tuner channel list fetches

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Transcoder Metrics
// =============================================================================

/// Transcoder processes spawned.
pub static TRANSCODES_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tunerhls_transcodes_started_total",
        "Total transcoder processes spawned",
    )
    .unwrap()
});

/// Transcodes that never became playable, by reason.
pub static TRANSCODE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tunerhls_transcode_failures_total",
            "Transcodes that failed before their playlist appeared",
        ),
        &["reason"], // "spawn", "exited", "superseded"
    )
    .unwrap()
});

/// Transcoder stops, by what triggered them.
pub static TRANSCODE_STOPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tunerhls_transcode_stops_total", "Transcoder stops"),
        &["reason"], // "explicit", "idle", "switch", "shutdown"
    )
    .unwrap()
});

/// Time from channel request to playlist availability.
pub static READINESS_WAIT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tunerhls_readiness_wait_seconds",
            "Time spent waiting for a channel playlist",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["result"], // "ready", "failed"
    )
    .unwrap()
});

// =============================================================================
// Segment Metrics
// =============================================================================

/// Files removed by segment cleanup.
pub static SEGMENT_FILES_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tunerhls_segment_files_deleted_total",
        "Files removed from the segment directory by cleanup",
    )
    .unwrap()
});

// =============================================================================
// Tuner Metrics
// =============================================================================

/// Channel list fetches from the tuner, by result.
pub static CHANNEL_LIST_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tunerhls_channel_list_fetches_total",
            "Channel list requests made to the tuner",
        ),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Transcoder
        Box::new(TRANSCODES_STARTED.clone()),
        Box::new(TRANSCODE_FAILURES.clone()),
        Box::new(TRANSCODE_STOPS.clone()),
        Box::new(READINESS_WAIT_DURATION.clone()),
        // Segments
        Box::new(SEGMENT_FILES_DELETED.clone()),
        // Tuner
        Box::new(CHANNEL_LIST_FETCHES.clone()),
    ]
}
