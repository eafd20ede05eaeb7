//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock transcoder launcher and a temporary segment directory, so the
//! full HTTP surface can be exercised without ffmpeg or a tuner.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tunerhls_core::testing::{MockBehavior, MockLauncher};
use tunerhls_core::{ChannelListClient, Config, Launcher, SessionManager};
use tunerhls_server::state::AppState;

/// External address the fixture's redirects point at.
pub const URL_PREFIX: &str = "http://gateway.test:8080";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_channel_redirect() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.get("/channel/101").await;
///
///     assert_eq!(response.status, 302);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock launcher - control transcoder behavior and inspect launches
    pub launcher: Arc<MockLauncher>,
    pub sessions: Arc<SessionManager>,
    /// Segment directory served under /stream
    pub segment_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Behavior of launched mock transcoders
    pub behavior: MockBehavior,
    /// Tuner channel list URL (defaults to an unreachable address)
    pub channel_list_url: Option<String>,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let segment_dir = TempDir::new().expect("Failed to create temp dir");
        let launcher = Arc::new(MockLauncher::with_behavior(test_config.behavior));

        let config = test_app_config(segment_dir.path(), test_config.channel_list_url);

        let sessions = Arc::new(SessionManager::new(
            &config,
            Arc::clone(&launcher) as Arc<dyn Launcher>,
        ));
        let channels = ChannelListClient::new(&config).expect("Failed to create tuner client");

        let state = Arc::new(AppState::new(config, Arc::clone(&sessions), channels));
        let router = tunerhls_server::api::create_router(state);

        Self {
            router,
            launcher,
            sessions,
            segment_dir,
        }
    }

    /// Create a fixture whose tuner serves `list` as its channel list.
    pub async fn with_tuner_list(list: &'static str) -> Self {
        let url = spawn_tuner(list).await;
        Self::with_config(TestConfig {
            channel_list_url: Some(url),
            ..Default::default()
        })
        .await
    }

    /// Path of a file in the segment directory.
    pub fn segment_path(&self, name: &str) -> std::path::PathBuf {
        self.segment_dir.path().join(name)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

fn test_app_config(segment_dir: &Path, channel_list_url: Option<String>) -> Config {
    let mut config = Config::default();
    config.server.url_prefix = URL_PREFIX.to_string();
    config.tuner.address = "10.9.9.9".to_string();
    config.tuner.channel_list_url =
        Some(channel_list_url.unwrap_or_else(|| "http://127.0.0.1:1/n7_tv_chlist.m3u".into()));
    config.transcoder.segment_dir = segment_dir.to_path_buf();
    config.transcoder.stop_grace_ms = 5;
    config.session.readiness_poll_interval_ms = 10;
    config
}

/// Serve `list` at `/n7_tv_chlist.m3u` on a local port, returning its URL.
async fn spawn_tuner(list: &'static str) -> String {
    let app = Router::new().route("/n7_tv_chlist.m3u", get(move || async move { list }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind tuner");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}/n7_tv_chlist.m3u", addr)
}
