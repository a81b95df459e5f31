//! Tracks metadata for a loading/rendering session.

use std::sync::Arc;

use crate::log;

/// Metadata for a loading/rendering session.
///
/// A session is created once by the caller, and cloned into the objects that need to
/// emit log messages (the filter loader, the filter renderer).
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    log_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                log_enabled: log::log_enabled(),
            }),
        }
    }
}

impl Session {
    /// Creates a session with logging taken from the `VECTORFX_LOG` environment variable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with logging always turned off, regardless of the environment.
    pub fn new_for_test_suite() -> Self {
        Self {
            inner: Arc::new(SessionInner { log_enabled: false }),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.inner.log_enabled
    }
}
