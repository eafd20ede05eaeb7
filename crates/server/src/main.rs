use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunerhls_core::{
    load_config, load_config_from_env, validate_config, ChannelListClient, Config,
    FfmpegLauncher, Launcher, SessionManager,
};
use tunerhls_server::api::create_router;
use tunerhls_server::state::AppState;

/// Default config file, used when present and `TUNERHLS_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Tuner: {}", config.tuner.address);
    info!("Segment directory: {:?}", config.transcoder.segment_dir);

    let launcher: Arc<dyn Launcher> = Arc::new(FfmpegLauncher::new());
    if let Err(e) = launcher.validate(&config.transcoder.ffmpeg_path).await {
        warn!(
            "Transcoder {:?} is not usable, channel requests will fail: {}",
            config.transcoder.ffmpeg_path, e
        );
    }

    let sessions = Arc::new(SessionManager::new(&config, launcher));

    // Output left behind by a previous run is never valid.
    sessions
        .store()
        .ensure_root()
        .await
        .context("Failed to prepare segment directory")?;
    let report = sessions.store().delete_all().await;
    if report.deleted > 0 {
        info!("Removed {} stale files from segment directory", report.deleted);
    }

    let channels = ChannelListClient::new(&config).context("Failed to create tuner client")?;

    let monitor = sessions.spawn_idle_monitor();

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&sessions), channels));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    monitor.stop().await;
    if sessions.shutdown().await.was_running {
        info!("Transcoder stopped");
    }

    Ok(())
}

/// Load configuration from `TUNERHLS_CONFIG`, `config.toml` or the
/// environment alone, in that order.
fn load() -> Result<Config> {
    let explicit = std::env::var("TUNERHLS_CONFIG").ok().map(PathBuf::from);
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);

    let config_path = match explicit {
        Some(path) => Some(path),
        None if default.exists() => Some(default),
        None => None,
    };

    match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => {
            info!("No config file, using defaults and environment");
            load_config_from_env().context("Failed to load config from environment")
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
