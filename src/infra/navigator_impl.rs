use crate::domain_port::Navigator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Ends the running application when asked to leave it.
///
/// A terminal client has no login page to jump to, so "navigating" means
/// telling the user where to continue and cancelling the app's root token.
pub struct ShutdownNavigator {
    cancel: CancellationToken,
    fired: AtomicBool,
}

impl ShutdownNavigator {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            fired: AtomicBool::new(false),
        }
    }
}

impl Navigator for ShutdownNavigator {
    fn navigate(&self, path: &str) {
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::warn!(path, "session ended, sign in again to continue");
        self.cancel.cancel();
    }
}

/// Remembers every navigation instead of performing it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
