//! Auth-state broadcast for the rendering shell.
//!
//! A shell subscribes once and toggles guest-only / authed-only / admin-only
//! chrome from the received state, instead of polling the session.

use tokio::sync::watch;

/// Coarse auth state driving UI visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthUiState {
    /// Nobody is signed in.
    #[default]
    Guest,
    /// A non-privileged account is signed in.
    User,
    /// The privileged admin is signed in.
    Admin,
}

/// Broadcast channel for [`AuthUiState`] changes.
#[derive(Debug)]
pub struct AuthUi {
    tx: watch::Sender<AuthUiState>,
}

impl AuthUi {
    /// Create a channel starting in the `Guest` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthUiState::Guest);
        Self { tx }
    }

    /// Publish a new state. Succeeds with or without subscribers.
    pub fn publish(&self, state: AuthUiState) {
        self.tx.send_replace(state);
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthUiState> {
        self.tx.subscribe()
    }

    /// The most recently published state.
    #[must_use]
    pub fn current(&self) -> AuthUiState {
        *self.tx.borrow()
    }
}

impl Default for AuthUi {
    fn default() -> Self {
        Self::new()
    }
}
