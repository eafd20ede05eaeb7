//! Testing utilities and mock implementations.
//!
//! [`MockLauncher`] stands in for the ffmpeg launcher so the session logic can
//! be exercised without spawning real processes. Mock processes simulate
//! transcoder output by writing a playlist and a segment into the working
//! directory of the invocation.
//!
//! # Example
//!
//! ```rust,ignore
//! use tunerhls_core::testing::{MockBehavior, MockLauncher};
//!
//! let launcher = Arc::new(MockLauncher::new());
//! launcher.set_behavior(MockBehavior::ExitImmediately);
//!
//! // Use in a SessionManager...
//!
//! assert_eq!(launcher.launch_count(), 1);
//! assert!(launcher.max_concurrent() <= 1);
//! ```

mod mock_launcher;

pub use mock_launcher::{MockBehavior, MockLauncher};
