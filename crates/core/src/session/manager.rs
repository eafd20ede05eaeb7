//! Session manager implementation.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::error::SessionError;
use super::types::{RedirectTarget, SessionState, SessionStatus, Stopped};
use crate::config::{Config, SessionConfig};
use crate::metrics::{READINESS_WAIT_DURATION, TRANSCODE_FAILURES, TRANSCODE_STOPS};
use crate::segments::SegmentStore;
use crate::transcoder::{ChannelId, Launcher, ProcessSupervisor};

/// State guarded by the session lock.
struct Session {
    state: SessionState,
    channel: Option<ChannelId>,
    supervisor: ProcessSupervisor,
    /// Bumped on every successful spawn.
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    auto_stop_armed: bool,
}

impl Session {
    fn mark_idle(&mut self) {
        self.state = SessionState::Idle;
        self.started_at = None;
        self.auto_stop_armed = false;
    }
}

/// Coordinates channel requests, stops and idle checks against the single
/// transcoder process.
pub struct SessionManager {
    session: Mutex<Session>,
    store: SegmentStore,
    url_prefix: String,
    idle_timeout: Duration,
    idle_check_interval: Duration,
    poll_interval: Duration,
    epoch: Instant,
    /// Milliseconds after `epoch` of the last client activity.
    last_access_ms: AtomicU64,
    /// Requests that chose the current process and have not redirected yet.
    pending_requests: AtomicUsize,
}

/// Holds a request's claim on the current process until dropped.
struct PendingRequest<'a>(&'a AtomicUsize);

impl<'a> PendingRequest<'a> {
    fn claim(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionManager {
    /// Creates a manager for the given configuration.
    pub fn new(config: &Config, launcher: Arc<dyn Launcher>) -> Self {
        let supervisor = ProcessSupervisor::new(
            launcher,
            config.transcoder.clone(),
            config.tuner.stream_url_template(),
        );
        Self::with_supervisor(supervisor, &config.session, &config.server.url_prefix)
    }

    /// Creates a manager around an existing supervisor.
    pub fn with_supervisor(
        supervisor: ProcessSupervisor,
        config: &SessionConfig,
        url_prefix: &str,
    ) -> Self {
        let store = supervisor.store().clone();
        Self {
            session: Mutex::new(Session {
                state: SessionState::Idle,
                channel: None,
                supervisor,
                generation: 0,
                started_at: None,
                auto_stop_armed: false,
            }),
            store,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            idle_check_interval: Duration::from_secs(config.idle_check_interval_secs),
            poll_interval: Duration::from_millis(config.readiness_poll_interval_ms),
            epoch: Instant::now(),
            last_access_ms: AtomicU64::new(0),
            pending_requests: AtomicUsize::new(0),
        }
    }

    /// Overrides the readiness poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn idle_check_interval(&self) -> Duration {
        self.idle_check_interval
    }

    pub fn redirect_target(&self, channel: &ChannelId) -> RedirectTarget {
        RedirectTarget::for_channel(&self.url_prefix, channel)
    }

    /// Makes sure `channel` is being transcoded and waits until its playlist
    /// exists.
    ///
    /// Starts a new transcoder when a different channel is selected or the
    /// current process is gone; otherwise reuses the running one. Blocks with
    /// no timeout until the playlist appears or the process dies.
    pub async fn request_channel(&self, channel: &ChannelId) -> Result<RedirectTarget, SessionError> {
        // The claim and the touch happen under the lock, so a queued idle
        // check can never stop the process this request just chose.
        let (generation, _claim) = {
            let mut session = self.session.lock().await;

            let generation = if session.channel.as_ref() == Some(channel)
                && session.supervisor.is_alive()
            {
                debug!("Channel {} already transcoding", channel);
                session.generation
            } else {
                session.channel = Some(channel.clone());
                session.state = SessionState::Starting;
                session.auto_stop_armed = false;

                if let Err(e) = session.supervisor.start(channel).await {
                    session.mark_idle();
                    return Err(e.into());
                }

                session.generation += 1;
                session.started_at = Some(Utc::now());
                session.generation
            };

            self.touch();
            (generation, PendingRequest::claim(&self.pending_requests))
        };

        self.wait_for_playlist(channel, generation).await?;

        debug!("Redirecting to transcoded playlist for channel {}", channel);
        self.touch();

        let mut session = self.session.lock().await;
        if session.generation == generation {
            session.auto_stop_armed = true;
            if session.state == SessionState::Starting {
                session.state = SessionState::Streaming;
            }
        }

        Ok(self.redirect_target(channel))
    }

    /// Polls for the playlist of `channel` until it exists while process
    /// `generation` is still alive.
    async fn wait_for_playlist(&self, channel: &ChannelId, generation: u64) -> Result<(), SessionError> {
        let playlist = channel.playlist_name();
        let started = Instant::now();

        loop {
            let exists = self.store.exists(&playlist).await;

            {
                let mut session = self.session.lock().await;

                if session.generation != generation {
                    warn!(
                        "Channel {} was replaced by channel {:?} while starting",
                        channel, session.channel
                    );
                    return Err(self.readiness_failed(channel, started, "superseded"));
                }

                if !session.supervisor.is_alive() {
                    if session.supervisor.has_process() {
                        error!("Transcoder for channel {} exited before producing {}", channel, playlist);
                        session.supervisor.reap().await;
                        session.mark_idle();
                    } else {
                        warn!("Transcoder for channel {} was stopped while starting", channel);
                    }
                    return Err(self.readiness_failed(channel, started, "exited"));
                }

                if exists {
                    READINESS_WAIT_DURATION
                        .with_label_values(&["ready"])
                        .observe(started.elapsed().as_secs_f64());
                    return Ok(());
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn readiness_failed(&self, channel: &ChannelId, started: Instant, reason: &str) -> SessionError {
        TRANSCODE_FAILURES.with_label_values(&[reason]).inc();
        READINESS_WAIT_DURATION
            .with_label_values(&["failed"])
            .observe(started.elapsed().as_secs_f64());
        SessionError::transcode_failed(channel)
    }

    /// Stops the current transcoder, if any. Idempotent.
    pub async fn stop_current(&self) -> Stopped {
        self.stop_with_reason("explicit").await
    }

    /// Stops the current transcoder before the server exits.
    pub async fn shutdown(&self) -> Stopped {
        self.stop_with_reason("shutdown").await
    }

    async fn stop_with_reason(&self, reason: &str) -> Stopped {
        let mut session = self.session.lock().await;
        let was_running = Self::stop_locked(&mut session).await;
        if was_running {
            TRANSCODE_STOPS.with_label_values(&[reason]).inc();
        }
        Stopped { was_running }
    }

    async fn stop_locked(session: &mut Session) -> bool {
        session.state = SessionState::Stopping;
        session.auto_stop_armed = false;
        let was_running = session.supervisor.stop().await;
        session.mark_idle();
        was_running
    }

    /// Records client activity.
    pub fn touch(&self) {
        let elapsed = self.epoch.elapsed().as_millis() as u64;
        self.last_access_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    /// Time of the last client activity.
    pub fn last_access(&self) -> Instant {
        self.epoch + Duration::from_millis(self.last_access_ms.load(Ordering::Relaxed))
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_access())
    }

    /// Stops the transcoder if nobody has used it for longer than the idle
    /// timeout. Returns whether a stop happened.
    pub async fn check_idle(&self) -> bool {
        self.check_idle_at(Instant::now()).await
    }

    /// [`Self::check_idle`] evaluated at `now`.
    pub async fn check_idle_at(&self, now: Instant) -> bool {
        if self.idle_for(now) <= self.idle_timeout {
            return false;
        }

        let mut session = self.session.lock().await;
        if !session.auto_stop_armed || !session.supervisor.has_process() {
            return false;
        }
        if self.pending_requests.load(Ordering::SeqCst) > 0 {
            debug!("Idle check skipped, a request is using the transcoder");
            return false;
        }
        // A request may have touched the session while we waited for the lock.
        let idle = self.idle_for(now);
        if idle <= self.idle_timeout {
            return false;
        }

        info!(
            "No activity on channel {:?} for {}s, stopping",
            session.channel,
            idle.as_secs()
        );
        let was_running = Self::stop_locked(&mut session).await;
        if was_running {
            TRANSCODE_STOPS.with_label_values(&["idle"]).inc();
        }
        was_running
    }

    /// Snapshot of the session for status reporting.
    ///
    /// Taken under the session lock, so the reported state is never
    /// `Stopping`.
    pub async fn status(&self) -> SessionStatus {
        let mut session = self.session.lock().await;
        let alive = session.supervisor.is_alive();
        SessionStatus {
            state: session.state,
            channel: session.channel.clone(),
            pid: if alive { session.supervisor.pid() } else { None },
            generation: session.generation,
            started_at: session.started_at,
            idle_secs: self.idle_for(Instant::now()).as_secs(),
            auto_stop_armed: session.auto_stop_armed,
        }
    }
}
