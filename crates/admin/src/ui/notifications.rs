//! Transient, queued status notifications.
//!
//! Multiple notifications may coexist, each with an independent auto-dismiss
//! timer. Contrast with [`crate::ui::LoadingOverlay`], which is
//! mutually-exclusive.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::sync::lock;

/// Message severity, mapped to styling by the rendering shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

/// One visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Handle for manual dismissal.
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Queue of currently visible notifications.
///
/// Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<NotificationInner>,
}

#[derive(Debug, Default)]
struct NotificationInner {
    next_id: AtomicU64,
    active: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    /// Auto-dismiss delay used by [`Self::notify`].
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a notification with the default auto-dismiss delay.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notify_for(message, severity, Self::DEFAULT_DURATION)
    }

    /// Enqueue a notification that dismisses itself after `duration`.
    ///
    /// Returns the notification id, usable with [`Self::dismiss`]. When no
    /// async runtime is available the notification stays until dismissed
    /// manually.
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
        };
        tracing::debug!(id, severity = ?notification.severity, "notification: {}", notification.message);
        lock(&self.inner.active).push(notification);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let weak = Arc::downgrade(&self.inner);
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                if let Some(inner) = weak.upgrade() {
                    lock(&inner.active).retain(|n| n.id != id);
                }
            });
        }

        id
    }

    /// Remove a notification before its timer fires.
    ///
    /// Returns whether it was still visible.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut active = lock(&self.inner.active);
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() != before
    }

    /// Snapshot of the currently visible notifications, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        lock(&self.inner.active).clone()
    }
}
