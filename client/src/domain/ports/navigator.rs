//! Driven port for programmatic navigation.
//!
//! The API client pushes `/login` through this port when the server rejects
//! the credential; [`crate::domain::Router`] is the production implementation.

use std::sync::{Mutex, PoisonError};

/// Port for requesting a route change.
pub trait Navigator: Send + Sync {
    /// Request navigation to `path`. The router may redirect.
    fn push(&self, path: &str);
}

/// Navigator that only records requested paths.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pushed: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths pushed so far, oldest first.
    pub fn pushed(&self) -> Vec<String> {
        self.pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        self.pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
