//! Session lifecycle: the single current identity and its rolling expiry.
//!
//! The identity provider owns credential checks and token validity; this
//! module owns the client-side lifetime on top of it. A session is valid only
//! while both hold: the provider still reports it, and it is younger than
//! [`SESSION_LIFETIME`]. Once the age limit passes, the session is torn down
//! regardless of what the provider says.
//!
//! Validity is checked against the provider on every protected-view entry
//! (via [`SessionManager::require_admin`]); the expiry timer exists only to
//! force an idle page to the logged-out state. There is no periodic poller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use velvet_lane_core::Email;

use crate::clock::Clock;
use crate::error::{AdminError, AuthFailureKind};
use crate::providers::{Identity, IdentityProvider};
use crate::sync::lock;
use crate::ui::{AuthUi, AuthUiState, NotificationCenter, Severity};

/// Fixed client-side session lifetime.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(SESSION_LIFETIME_SECS as u64);

const SESSION_LIFETIME_SECS: i64 = 60 * 60;

/// Why a session ended without the user asking for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The session aged past [`SESSION_LIFETIME`].
    Expired,
}

/// Result of a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A live, non-expired session.
    Active {
        identity: Identity,
        expires_at: DateTime<Utc>,
    },
    /// No session; `reason` is set when this check itself ended one.
    Empty { reason: Option<SignOutReason> },
}

impl SessionState {
    /// The current identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Active { identity, .. } => Some(identity),
            Self::Empty { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Owns the current identity and enforces the rolling session lifetime.
///
/// Cloning shares the session; there is at most one current identity per
/// instance (single active session per page context).
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    notifications: NotificationCenter,
    auth_ui: AuthUi,
    admin_email: Email,
    state: Mutex<SessionSlot>,
}

/// Invariant: `expires_at.is_some() == identity.is_some()`.
#[derive(Default)]
struct SessionSlot {
    identity: Option<Identity>,
    expires_at: Option<DateTime<Utc>>,
    timer: Option<JoinHandle<()>>,
    pending_redirect: Option<String>,
}

impl SessionManager {
    /// Create a session manager over the given provider.
    ///
    /// `admin_email` is the single privileged address; every other identity
    /// is torn down on sight by the admin gate.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        notifications: NotificationCenter,
        admin_email: Email,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                provider,
                clock,
                notifications,
                auth_ui: AuthUi::new(),
                admin_email,
                state: Mutex::new(SessionSlot::default()),
            }),
        }
    }

    /// Check credentials and establish the admin session.
    ///
    /// The email is trimmed and lowercased before the provider sees it. On
    /// success the expiry timer is (re)armed for the full lifetime and the
    /// admin auth state is published. A pending redirect target, if any,
    /// stays stored for the caller to consume via [`Self::take_redirect`].
    ///
    /// # Errors
    ///
    /// - [`AdminError::Validation`] if email or password is empty (no
    ///   provider call is made)
    /// - [`AdminError::AuthFailed`] with the classified reason on provider
    ///   failure; no timer is armed
    /// - [`AdminError::AccessDenied`] if the credentials were valid but the
    ///   identity is not the privileged address; the fresh session is torn
    ///   down before returning
    pub async fn establish_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AdminError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AdminError::Validation(
                "Please enter both email and password.".to_owned(),
            ));
        }

        let session = self
            .inner
            .provider
            .sign_in_with_password(&email, password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "sign-in failed");
                AdminError::AuthFailed(AuthFailureKind::classify(&e))
            })?;

        if session.identity.email != self.inner.admin_email {
            tracing::warn!(
                email = %session.identity.email,
                "non-privileged sign-in; tearing session down"
            );
            self.end_session().await;
            return Err(AdminError::AccessDenied);
        }

        let identity = session.identity;
        let now = self.inner.clock.now();
        {
            let mut slot = lock(&self.inner.state);
            slot.identity = Some(identity.clone());
            slot.expires_at = Some(now + chrono::Duration::seconds(SESSION_LIFETIME_SECS));
        }
        self.arm_expiry_timer();
        self.inner.auth_ui.publish(AuthUiState::Admin);
        tracing::info!(email = %identity.email, "session established");

        Ok(identity)
    }

    /// Query the provider's live session and apply the client-side age limit.
    ///
    /// A session older than [`SESSION_LIFETIME`] is torn down here and
    /// reported as `Empty` with [`SignOutReason::Expired`]; a younger one
    /// re-arms the expiry timer. Provider failures are reported to the user
    /// and yield an empty state.
    pub async fn current_session(&self) -> SessionState {
        let session = match self.inner.provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "auth state check failed");
                self.inner
                    .notifications
                    .notify("Authentication error occurred", Severity::Error);
                return SessionState::Empty { reason: None };
            }
        };

        let Some(session) = session else {
            self.inner.auth_ui.publish(AuthUiState::Guest);
            return SessionState::Empty { reason: None };
        };

        let now = self.inner.clock.now();
        let age = now.signed_duration_since(session.created_at);
        if age >= chrono::Duration::seconds(SESSION_LIFETIME_SECS) {
            self.end_session().await;
            self.inner
                .notifications
                .notify(AdminError::Expired.user_message(), Severity::Warning);
            return SessionState::Empty {
                reason: Some(SignOutReason::Expired),
            };
        }

        let expires_at = session.created_at + chrono::Duration::seconds(SESSION_LIFETIME_SECS);
        let identity = session.identity;
        {
            let mut slot = lock(&self.inner.state);
            slot.identity = Some(identity.clone());
            slot.expires_at = Some(expires_at);
        }
        self.arm_expiry_timer();
        self.inner.auth_ui.publish(if identity.email == self.inner.admin_email {
            AuthUiState::Admin
        } else {
            AuthUiState::User
        });

        SessionState::Active {
            identity,
            expires_at,
        }
    }

    /// Tear the session down. Never fails observably.
    ///
    /// Cancels the expiry timer, asks the provider to invalidate its session
    /// (errors are logged and discarded), clears the cached identity, and
    /// publishes the guest auth state. The UI always reaches logged-out.
    pub async fn end_session(&self) {
        {
            let mut slot = lock(&self.inner.state);
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
            slot.identity = None;
            slot.expires_at = None;
        }

        if let Err(e) = self.inner.provider.sign_out().await {
            tracing::warn!(error = %e, "provider sign-out failed; local session cleared anyway");
        }

        self.inner.auth_ui.publish(AuthUiState::Guest);
        tracing::info!("session ended");
    }

    /// Gate for protected views.
    ///
    /// Returns true only for a valid, privileged, non-expired session. On
    /// every failure path the originating `origin_fragment` is stored so a
    /// successful login can restore it; a non-privileged identity is torn
    /// down before returning.
    pub async fn require_admin(&self, origin_fragment: &str) -> bool {
        match self.current_session().await {
            SessionState::Active { identity, .. } => {
                if identity.email == self.inner.admin_email {
                    true
                } else {
                    self.end_session().await;
                    self.set_redirect(origin_fragment);
                    self.inner.notifications.notify(
                        "Access denied. Admin privileges required.",
                        Severity::Error,
                    );
                    false
                }
            }
            SessionState::Empty { reason } => {
                self.set_redirect(origin_fragment);
                if reason.is_none() {
                    self.inner
                        .notifications
                        .notify("Access denied. Admin login required.", Severity::Error);
                }
                false
            }
        }
    }

    /// Consume the pending redirect target stored by a failed gate check.
    pub fn take_redirect(&self) -> Option<String> {
        lock(&self.inner.state).pending_redirect.take()
    }

    /// The cached identity, without consulting the provider.
    #[must_use]
    pub fn cached_identity(&self) -> Option<Identity> {
        lock(&self.inner.state).identity.clone()
    }

    /// Whether an expiry timer is currently armed.
    #[must_use]
    pub fn expiry_timer_armed(&self) -> bool {
        lock(&self.inner.state).timer.is_some()
    }

    /// Subscribe to auth-state changes.
    #[must_use]
    pub fn subscribe_auth_state(&self) -> tokio::sync::watch::Receiver<AuthUiState> {
        self.inner.auth_ui.subscribe()
    }

    /// The most recently published auth state.
    #[must_use]
    pub fn auth_state(&self) -> AuthUiState {
        self.inner.auth_ui.current()
    }

    fn set_redirect(&self, origin_fragment: &str) {
        lock(&self.inner.state).pending_redirect = Some(origin_fragment.to_owned());
    }

    /// Arm the expiry timer for the full lifetime, replacing any prior timer.
    ///
    /// At most one timer is outstanding. The task holds only a weak
    /// reference, so a dropped session manager never fires a stray logout.
    fn arm_expiry_timer(&self) {
        let weak = Arc::downgrade(&self.inner);
        let mut slot = lock(&self.inner.state);
        if let Some(old) = slot.timer.take() {
            old.abort();
        }
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(SESSION_LIFETIME).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let manager = SessionManager { inner };
            {
                // Drop this task's own handle so end_session doesn't abort us
                // mid-teardown.
                let mut slot = lock(&manager.inner.state);
                slot.timer = None;
            }
            tracing::info!("session lifetime elapsed; forcing logout");
            manager.end_session().await;
            manager.inner.notifications.notify(
                "Your session has expired for security reasons.",
                Severity::Warning,
            );
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::clock::ManualClock;
    use crate::providers::{ProviderError, ProviderSession};

    use super::*;

    /// Scriptable provider for session tests.
    #[derive(Default)]
    struct StubProvider {
        session: Mutex<Option<ProviderSession>>,
        password: Option<(String, String)>,
        sign_out_calls: AtomicUsize,
    }

    impl StubProvider {
        fn with_account(email: &str, password: &str) -> Self {
            Self {
                password: Some((email.to_owned(), password.to_owned())),
                ..Self::default()
            }
        }

        fn identity(email: &str) -> Identity {
            Identity {
                id: Uuid::new_v4(),
                email: Email::parse(email).unwrap(),
                created_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<ProviderSession, ProviderError> {
            match &self.password {
                Some((e, p)) if e == email && p == password => {
                    let session = ProviderSession {
                        identity: Self::identity(email),
                        created_at: Utc::now(),
                    };
                    *self.session.lock().unwrap() = Some(session.clone());
                    Ok(session)
                }
                _ => Err(ProviderError::InvalidCredentials),
            }
        }

        async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    fn manager_with(provider: Arc<StubProvider>, clock: ManualClock) -> SessionManager {
        SessionManager::new(
            provider,
            Arc::new(clock),
            NotificationCenter::new(),
            Email::parse("admin@velvetlane.shop").unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_credentials_rejected_before_provider() {
        let provider = Arc::new(StubProvider::default());
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        let result = manager.establish_session("", "secret").await;
        assert!(matches!(result, Err(AdminError::Validation(_))));

        let result = manager.establish_session("admin@velvetlane.shop", "").await;
        assert!(matches!(result, Err(AdminError::Validation(_))));
        assert!(!manager.expiry_timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_establish_session_normalizes_email() {
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        let identity = manager
            .establish_session("  Admin@VelvetLane.shop ", "pw")
            .await
            .unwrap();
        assert_eq!(identity.email.as_str(), "admin@velvetlane.shop");
        assert!(manager.expiry_timer_armed());
        assert_eq!(manager.auth_state(), AuthUiState::Admin);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_credentials_classified_and_no_timer() {
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        let result = manager.establish_session("bad@x.com", "wrong").await;
        assert!(matches!(
            result,
            Err(AdminError::AuthFailed(AuthFailureKind::InvalidCredentials))
        ));
        assert!(!manager.expiry_timer_armed());
        assert_eq!(manager.take_redirect(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_privileged_identity_is_torn_down() {
        let provider = Arc::new(StubProvider::with_account("visitor@x.com", "pw"));
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        let result = manager.establish_session("visitor@x.com", "pw").await;
        assert!(matches!(result, Err(AdminError::AccessDenied)));
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert!(manager.cached_identity().is_none());
        assert!(!manager.expiry_timer_armed());
        assert_eq!(manager.auth_state(), AuthUiState::Guest);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_torn_down_exactly_once() {
        let clock = ManualClock::new(Utc::now());
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let notifications = NotificationCenter::new();
        let manager = SessionManager::new(
            Arc::clone(&provider) as _,
            Arc::new(clock.clone()),
            notifications.clone(),
            Email::parse("admin@velvetlane.shop").unwrap(),
        );

        manager
            .establish_session("admin@velvetlane.shop", "pw")
            .await
            .unwrap();

        clock.advance(chrono::Duration::hours(2));
        let state = manager.current_session().await;
        assert_eq!(
            state,
            SessionState::Empty {
                reason: Some(SignOutReason::Expired)
            }
        );
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert!(manager.cached_identity().is_none());
        assert!(
            notifications
                .active()
                .iter()
                .any(|n| n.message == AdminError::Expired.user_message())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_session_rearms_timer() {
        let clock = ManualClock::new(Utc::now());
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let manager = manager_with(Arc::clone(&provider), clock.clone());

        manager
            .establish_session("admin@velvetlane.shop", "pw")
            .await
            .unwrap();

        clock.advance(chrono::Duration::minutes(30));
        let state = manager.current_session().await;
        assert!(state.is_active());
        assert!(manager.expiry_timer_armed());
        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_and_forces_logout() {
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        manager
            .establish_session("admin@velvetlane.shop", "pw")
            .await
            .unwrap();

        tokio::task::yield_now().await;
        tokio::time::advance(SESSION_LIFETIME + Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(provider.sign_out_calls.load(Ordering::SeqCst), 1);
        assert!(manager.cached_identity().is_none());
        assert!(!manager.expiry_timer_armed());
        assert_eq!(manager.auth_state(), AuthUiState::Guest);
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_admin_stores_redirect_when_logged_out() {
        let provider = Arc::new(StubProvider::default());
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        assert!(!manager.require_admin("#products-view").await);
        assert_eq!(manager.take_redirect().as_deref(), Some("#products-view"));
        // consumed
        assert_eq!(manager.take_redirect(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_admin_accepts_live_admin_session() {
        let provider = Arc::new(StubProvider::with_account("admin@velvetlane.shop", "pw"));
        let manager = manager_with(Arc::clone(&provider), ManualClock::new(Utc::now()));

        manager
            .establish_session("admin@velvetlane.shop", "pw")
            .await
            .unwrap();
        assert!(manager.require_admin("#dashboard-view").await);
    }
}
