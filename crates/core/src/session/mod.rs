//! Transcoding session management.
//!
//! [`SessionManager`] owns the single process-wide session: which channel is
//! selected, the supervisor holding the transcoder process, and the idle
//! auto-stop state. Every decision that starts or stops a process happens
//! under one async mutex, so concurrent requests can never spawn two
//! transcoders or stop a process another request has just started.
//!
//! Waiting for a playlist happens outside that lock. The waiter only takes
//! the lock briefly on each poll to check that *its* process (identified by
//! the session generation) is still the live one.
//!
//! # Known race
//!
//! Concurrent requests for different channels are not queued: the last one to
//! take the lock wins, which stops the process the earlier request is waiting
//! on. The earlier request then fails with
//! [`SessionError::TranscodeFailed`]. Segment reads for the previous channel
//! that are in flight during a switch may likewise see their file disappear.
//!
//! # State machine
//!
//! ```text
//!            request(new channel / dead process)
//!   Idle ──────────────────────────────────────▶ Starting
//!    ▲                                              │ playlist present
//!    │ stop / idle timeout / process exited         ▼ and process alive
//!    └──────────────── Stopping ◀────────────── Streaming
//! ```

mod error;
mod manager;
mod monitor;
mod types;

pub use error::SessionError;
pub use manager::SessionManager;
pub use monitor::IdleMonitor;
pub use types::{RedirectTarget, SessionState, SessionStatus, Stopped};
