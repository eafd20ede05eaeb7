//! Mock transcoder launcher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::transcoder::{ChannelId, Invocation, Launcher, TranscodeProcess, TranscoderError};

/// What a launched mock process does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Writes the playlist and one segment at launch, then keeps running.
    #[default]
    WritePlaylist,
    /// Keeps running and writes the playlist after the delay.
    WritePlaylistAfter(Duration),
    /// Keeps running and never writes anything.
    Stall,
    /// Exits right away without writing anything.
    ExitImmediately,
    /// Keeps running for the delay, then exits without writing anything.
    ExitAfter(Duration),
    /// Launch fails as if the binary were missing.
    SpawnError,
}

/// Mock implementation of the Launcher trait.
///
/// Provides controllable behavior for testing:
/// - Record every invocation for assertions
/// - Simulate transcoder output, slow starts and crashes
/// - Track how many processes are alive at once
#[derive(Debug)]
pub struct MockLauncher {
    behavior: Mutex<MockBehavior>,
    launches: Mutex<Vec<Invocation>>,
    processes: Mutex<Vec<Arc<AtomicBool>>>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
    next_pid: AtomicU32,
    kill_fails: AtomicBool,
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLauncher {
    /// Create a new mock launcher whose processes write their playlist at once.
    pub fn new() -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::default()),
            launches: Mutex::new(Vec::new()),
            processes: Mutex::new(Vec::new()),
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
            next_pid: AtomicU32::new(1000),
            kill_fails: AtomicBool::new(false),
        }
    }

    /// Create a mock launcher with the given behavior.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let launcher = Self::new();
        launcher.set_behavior(behavior);
        launcher
    }

    /// Set the behavior of subsequently launched processes.
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Make `kill` report an error (the process still dies when dropped).
    pub fn set_kill_fails(&self, fails: bool) {
        self.kill_fails.store(fails, Ordering::SeqCst);
    }

    /// Every successful or failed launch, in order.
    pub fn launches(&self) -> Vec<Invocation> {
        lock(&self.launches).clone()
    }

    pub fn launch_count(&self) -> usize {
        lock(&self.launches).len()
    }

    /// Channels of all launches, in order.
    pub fn launched_channels(&self) -> Vec<ChannelId> {
        lock(&self.launches)
            .iter()
            .map(|i| i.channel.clone())
            .collect()
    }

    /// Number of processes currently alive.
    pub fn live_processes(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of processes that were ever alive at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    /// Simulate every launched process crashing.
    pub fn exit_all(&self) {
        for alive in lock(&self.processes).iter() {
            mark_dead(alive, &self.live);
        }
    }
}

#[async_trait]
impl Launcher for MockLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<Box<dyn TranscodeProcess>, TranscoderError> {
        lock(&self.launches).push(invocation.clone());

        let behavior = *lock(&self.behavior);
        if behavior == MockBehavior::SpawnError {
            return Err(TranscoderError::NotFound {
                path: invocation.program.clone(),
            });
        }

        let alive = Arc::new(AtomicBool::new(true));
        let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(now_live, Ordering::SeqCst);
        lock(&self.processes).push(Arc::clone(&alive));

        let dir = invocation.working_dir.clone();
        let channel = invocation.channel.clone();

        match behavior {
            MockBehavior::WritePlaylist => write_output(&dir, &channel),
            MockBehavior::WritePlaylistAfter(delay) => {
                let alive = Arc::clone(&alive);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if alive.load(Ordering::SeqCst) {
                        write_output(&dir, &channel);
                    }
                });
            }
            MockBehavior::Stall | MockBehavior::SpawnError => {}
            MockBehavior::ExitImmediately => mark_dead(&alive, &self.live),
            MockBehavior::ExitAfter(delay) => {
                let alive = Arc::clone(&alive);
                let live = Arc::clone(&self.live);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    mark_dead(&alive, &live);
                });
            }
        }

        Ok(Box::new(MockProcess {
            pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
            alive,
            live: Arc::clone(&self.live),
            kill_fails: self.kill_fails.load(Ordering::SeqCst),
        }))
    }

    async fn validate(&self, program: &Path) -> Result<(), TranscoderError> {
        if *lock(&self.behavior) == MockBehavior::SpawnError {
            return Err(TranscoderError::NotFound {
                path: PathBuf::from(program),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MockProcess {
    pid: u32,
    alive: Arc<AtomicBool>,
    live: Arc<AtomicUsize>,
    kill_fails: bool,
}

impl TranscodeProcess for MockProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn kill(&mut self) -> Result<(), TranscoderError> {
        if self.kill_fails {
            return Err(TranscoderError::KillFailed(std::io::Error::other(
                "simulated kill failure",
            )));
        }
        mark_dead(&self.alive, &self.live);
        Ok(())
    }
}

impl Drop for MockProcess {
    fn drop(&mut self) {
        mark_dead(&self.alive, &self.live);
    }
}

fn mark_dead(alive: &AtomicBool, live: &AtomicUsize) {
    if alive.swap(false, Ordering::SeqCst) {
        live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn write_output(dir: &Path, channel: &ChannelId) {
    let segment = format!("{}0.ts", channel);
    let playlist = format!(
        "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:5\n#EXTINF:5.000000,\n{}\n",
        segment
    );
    let _ = std::fs::write(dir.join(&segment), [0x47u8; 188]);
    let _ = std::fs::write(dir.join(channel.playlist_name()), playlist);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
