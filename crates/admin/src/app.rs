//! Top-level wiring for the admin dashboard.

use std::sync::Arc;

use async_trait::async_trait;

use velvet_lane_core::Email;

use crate::backend::BackendClient;
use crate::clock::{Clock, SystemClock};
use crate::config::AdminConfig;
use crate::controllers::{DashboardController, ProductFormController, ProductListController};
use crate::error::AdminError;
use crate::guard::{ActionGuard, ActionKey};
use crate::providers::{IdentityProvider, ObjectStore, ProductStore};
use crate::router::{ActiveView, ViewId, ViewLoaders, ViewRouter};
use crate::session::SessionManager;
use crate::ui::{LoadingOverlay, NotificationCenter, Severity};

/// The assembled admin application.
///
/// Owns the session, the router, and the per-view controllers. Cloning
/// shares all of them.
#[derive(Clone)]
pub struct AdminApp {
    session: SessionManager,
    router: ViewRouter,
    overlay: LoadingOverlay,
    notifications: NotificationCenter,
    guard: ActionGuard,
    dashboard: DashboardController,
    products: ProductListController,
    form: ProductFormController,
}

/// Adapter: the router's entry actions delegate to the controllers.
struct Loaders {
    dashboard: DashboardController,
    products: ProductListController,
}

#[async_trait]
impl ViewLoaders for Loaders {
    async fn load_dashboard_stats(&self) {
        self.dashboard.load_stats().await;
    }

    async fn load_recent_products(&self) {
        self.dashboard.load_recent().await;
    }

    async fn load_product_list(&self) {
        self.products.load().await;
    }
}

impl AdminApp {
    /// Assemble the application against the hosted backend.
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        let backend = Arc::new(BackendClient::new(config));
        Self::from_providers(
            Arc::clone(&backend) as _,
            Arc::clone(&backend) as _,
            backend as _,
            Arc::new(SystemClock),
            config.admin_email.clone(),
        )
    }

    /// Assemble the application against explicit provider implementations.
    ///
    /// This is the seam the end-to-end tests drive with in-memory fakes.
    #[must_use]
    pub fn from_providers(
        identity: Arc<dyn IdentityProvider>,
        products: Arc<dyn ProductStore>,
        objects: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        admin_email: Email,
    ) -> Self {
        let overlay = LoadingOverlay::new();
        let notifications = NotificationCenter::new();
        let guard = ActionGuard::new();

        let session = SessionManager::new(
            identity,
            Arc::clone(&clock),
            notifications.clone(),
            admin_email,
        );
        let dashboard = DashboardController::new(
            Arc::clone(&products),
            overlay.clone(),
            notifications.clone(),
        );
        let product_list = ProductListController::new(
            Arc::clone(&products),
            overlay.clone(),
            notifications.clone(),
            guard.clone(),
            dashboard.clone(),
        );
        let form = ProductFormController::new(
            products,
            objects,
            clock,
            overlay.clone(),
            notifications.clone(),
            guard.clone(),
            product_list.clone(),
            dashboard.clone(),
        );
        let router = ViewRouter::new(
            session.clone(),
            Arc::new(Loaders {
                dashboard: dashboard.clone(),
                products: product_list.clone(),
            }),
        );

        Self {
            session,
            router,
            overlay,
            notifications,
            guard,
            dashboard,
            products: product_list,
            form,
        }
    }

    /// Log the admin in; `Some` carries the fragment to navigate to.
    ///
    /// The target is the fragment a failed gate check stored, falling back
    /// to the dashboard. Rapid repeated logins collapse to one credential
    /// check: a call dropped by the in-flight guard returns `None` and
    /// navigates nowhere.
    ///
    /// # Errors
    ///
    /// Returns the session error after showing its user message; see
    /// [`SessionManager::establish_session`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<String>, AdminError> {
        let Some(_in_flight) = self.guard.try_begin(ActionKey::Login) else {
            tracing::debug!("login already in flight");
            return Ok(None);
        };

        self.overlay.show_busy("Signing you in...");
        let result = self.session.establish_session(email, password).await;
        self.overlay.clear_busy();

        match result {
            Ok(_) => {
                self.notifications
                    .notify("Welcome back! Login successful.", Severity::Success);
                Ok(Some(
                    self.session
                        .take_redirect()
                        .unwrap_or_else(|| ViewId::Dashboard.fragment().to_owned()),
                ))
            }
            Err(e) => {
                self.notifications.notify(e.user_message(), Severity::Error);
                Err(e)
            }
        }
    }

    /// Log out. Always lands in the logged-out state.
    pub async fn logout(&self) {
        self.overlay.show_busy("Logging out...");
        self.session.end_session().await;
        self.overlay.clear_busy();
        self.notifications
            .notify("You have been logged out successfully.", Severity::Success);
    }

    /// Route a fragment change; see [`ViewRouter::handle_fragment`].
    pub async fn handle_fragment(&self, fragment: &str) -> ActiveView {
        self.router.handle_fragment(fragment).await
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub const fn router(&self) -> &ViewRouter {
        &self.router
    }

    #[must_use]
    pub const fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[must_use]
    pub const fn dashboard(&self) -> &DashboardController {
        &self.dashboard
    }

    #[must_use]
    pub const fn products(&self) -> &ProductListController {
        &self.products
    }

    #[must_use]
    pub const fn product_form(&self) -> &ProductFormController {
        &self.form
    }
}
