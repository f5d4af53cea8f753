//! Mutually-exclusive full-screen busy indicator.

use std::sync::{Arc, Mutex};

use crate::sync::lock;

/// At most one busy indicator is visible at a time; showing a new one
/// replaces any prior indicator (last-call-wins, not stacked).
///
/// Cloning shares the indicator.
#[derive(Debug, Clone, Default)]
pub struct LoadingOverlay {
    message: Arc<Mutex<Option<String>>>,
}

impl LoadingOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the busy indicator with `message`, replacing any prior one.
    pub fn show_busy(&self, message: impl Into<String>) {
        *lock(&self.message) = Some(message.into());
    }

    /// Hide the busy indicator.
    pub fn clear_busy(&self) {
        *lock(&self.message) = None;
    }

    /// The currently shown message, if busy.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        lock(&self.message).clone()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.message).is_some()
    }
}
