//! Session lifecycle tests driving the manager with a mock launcher.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

use tunerhls_core::config::Config;
use tunerhls_core::testing::{MockBehavior, MockLauncher};
use tunerhls_core::{
    ChannelId, FfmpegLauncher, Launcher, SessionError, SessionManager, SessionState,
};

struct Setup {
    manager: Arc<SessionManager>,
    launcher: Arc<MockLauncher>,
    dir: TempDir,
}

fn config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.server.url_prefix = "http://gateway:8080".into();
    config.tuner.address = "10.1.1.1".into();
    config.transcoder.segment_dir = dir.path().to_path_buf();
    config.transcoder.stop_grace_ms = 5;
    config.session.readiness_poll_interval_ms = 10;
    config
}

fn setup(behavior: MockBehavior) -> Setup {
    let dir = TempDir::new().unwrap();
    let launcher = Arc::new(MockLauncher::with_behavior(behavior));
    let manager = Arc::new(SessionManager::new(
        &config(&dir),
        Arc::clone(&launcher) as Arc<dyn Launcher>,
    ));
    Setup {
        manager,
        launcher,
        dir,
    }
}

fn channel(id: &str) -> ChannelId {
    id.parse().unwrap()
}

#[tokio::test]
async fn test_request_launches_channel_and_redirects() {
    let s = setup(MockBehavior::WritePlaylist);

    let target = s.manager.request_channel(&channel("101")).await.unwrap();
    assert_eq!(target.as_str(), "http://gateway:8080/stream/101.m3u8");

    let launches = s.launcher.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].source_url, "http://10.1.1.1:8080/chlist/101");
    assert!(launches[0].args.iter().any(|a| a == "101.m3u8"));
    assert!(launches[0]
        .args
        .iter()
        .any(|a| a == "http://10.1.1.1:8080/chlist/101"));
    assert!(s.dir.path().join("101.m3u8").exists());
}

#[tokio::test]
async fn test_concurrent_requests_never_run_two_transcoders() {
    let s = setup(MockBehavior::WritePlaylistAfter(Duration::from_millis(20)));

    let ids = ["101", "202", "303", "404", "101", "202"];
    let requests = ids.iter().map(|id| {
        let manager = Arc::clone(&s.manager);
        let id = channel(id);
        async move { manager.request_channel(&id).await }
    });
    let results = join_all(requests).await;

    assert!(s.launcher.max_concurrent() <= 1);
    assert_eq!(s.launcher.live_processes(), 1);
    assert!(results.iter().any(|r| r.is_ok()));
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, SessionError::TranscodeFailed { .. }));
        }
    }
}

#[tokio::test]
async fn test_concurrent_requests_for_same_channel_share_process() {
    let s = setup(MockBehavior::WritePlaylistAfter(Duration::from_millis(30)));

    let requests = (0..5).map(|_| {
        let manager = Arc::clone(&s.manager);
        async move { manager.request_channel(&channel("101")).await }
    });
    let results = join_all(requests).await;

    assert_eq!(s.launcher.launch_count(), 1);
    for result in results {
        assert_eq!(
            result.unwrap().as_str(),
            "http://gateway:8080/stream/101.m3u8"
        );
    }
}

#[tokio::test]
async fn test_rerequest_is_idempotent() {
    let s = setup(MockBehavior::WritePlaylist);

    let first = s.manager.request_channel(&channel("101")).await.unwrap();
    let second = s.manager.request_channel(&channel("101")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(s.launcher.launch_count(), 1);
    assert_eq!(s.manager.status().await.generation, 1);
}

#[tokio::test]
async fn test_switch_stops_previous_channel_first() {
    let s = setup(MockBehavior::WritePlaylist);

    s.manager.request_channel(&channel("101")).await.unwrap();
    assert!(s.dir.path().join("101.m3u8").exists());

    s.manager.request_channel(&channel("202")).await.unwrap();

    assert_eq!(
        s.launcher.launched_channels(),
        vec![channel("101"), channel("202")]
    );
    assert_eq!(s.launcher.max_concurrent(), 1);
    assert!(!s.dir.path().join("101.m3u8").exists());
    assert!(!s.dir.path().join("1010.ts").exists());
    assert!(s.dir.path().join("202.m3u8").exists());
    assert_eq!(s.manager.status().await.channel, Some(channel("202")));
}

#[tokio::test]
async fn test_idle_session_is_stopped_and_cleaned() {
    let s = setup(MockBehavior::WritePlaylist);
    s.manager.request_channel(&channel("101")).await.unwrap();

    assert!(!s.manager.check_idle().await);
    assert!(
        s.manager
            .check_idle_at(Instant::now() + Duration::from_secs(61))
            .await
    );

    assert_eq!(s.launcher.live_processes(), 0);
    assert!(s.manager.store().list_all().await.unwrap().is_empty());
    assert_eq!(s.manager.status().await.state, SessionState::Idle);

    // Nothing left to stop.
    assert!(
        !s.manager
            .check_idle_at(Instant::now() + Duration::from_secs(120))
            .await
    );
}

#[tokio::test]
async fn test_stop_purges_segments() {
    let s = setup(MockBehavior::WritePlaylist);
    s.manager.request_channel(&channel("101")).await.unwrap();
    std::fs::write(s.dir.path().join("stale.ts"), b"old").unwrap();

    assert!(s.manager.stop_current().await.was_running);

    assert!(s.manager.store().list_all().await.unwrap().is_empty());
    assert_eq!(s.launcher.live_processes(), 0);
}

#[tokio::test]
async fn test_stop_tolerates_kill_failure() {
    let s = setup(MockBehavior::WritePlaylist);
    s.launcher.set_kill_fails(true);
    s.manager.request_channel(&channel("101")).await.unwrap();

    assert!(s.manager.stop_current().await.was_running);
    assert_eq!(s.launcher.live_processes(), 0);
    assert!(s.manager.store().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_process_exiting_before_playlist_fails_request() {
    let s = setup(MockBehavior::ExitImmediately);

    let err = s.manager.request_channel(&channel("101")).await.unwrap_err();
    assert!(matches!(err, SessionError::TranscodeFailed { .. }));

    let status = s.manager.status().await;
    assert_eq!(status.state, SessionState::Idle);
    assert!(status.pid.is_none());
}

#[tokio::test]
async fn test_invalid_executable_fails_without_handle() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.transcoder.ffmpeg_path = "/nonexistent/bin/ffmpeg".into();
    let manager = SessionManager::new(&config, Arc::new(FfmpegLauncher::new()));

    let err = manager.request_channel(&channel("303")).await.unwrap_err();
    assert!(matches!(err, SessionError::Spawn(_)));

    let status = manager.status().await;
    assert_eq!(status.state, SessionState::Idle);
    assert!(status.pid.is_none());
    assert_eq!(status.generation, 0);
    assert!(!manager.stop_current().await.was_running);
}

#[tokio::test]
async fn test_shutdown_stops_running_transcoder() {
    let s = setup(MockBehavior::WritePlaylist);
    s.manager.request_channel(&channel("101")).await.unwrap();

    assert!(s.manager.shutdown().await.was_running);
    assert_eq!(s.launcher.live_processes(), 0);
}
