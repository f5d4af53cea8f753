//! Fragment-driven view routing for the dashboard.
//!
//! Navigation is a URL fragment; the router resolves it to a view, runs the
//! admin gate, and fires the view's entry loads. Unknown and empty fragments
//! fall back to the dashboard so a stale bookmark never strands the user on
//! a blank screen.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::session::SessionManager;
use crate::sync::lock;

/// The dashboard's navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewId {
    /// Store overview: stat cards plus the recent-products table.
    #[default]
    Dashboard,
    /// Full product listing with per-row actions.
    Products,
    /// Create/edit product form.
    ProductForm,
    /// Analytics placeholder.
    Analytics,
}

impl ViewId {
    /// The fragment that navigates to this view.
    #[must_use]
    pub const fn fragment(self) -> &'static str {
        match self {
            Self::Dashboard => "#dashboard-view",
            Self::Products => "#products-view",
            Self::ProductForm => "#product-form-view",
            Self::Analytics => "#analytics-view",
        }
    }

    #[must_use]
    fn from_fragment(fragment: &str) -> Option<Self> {
        match fragment {
            "dashboard-view" => Some(Self::Dashboard),
            "products-view" => Some(Self::Products),
            "product-form-view" => Some(Self::ProductForm),
            "analytics-view" => Some(Self::Analytics),
            _ => None,
        }
    }
}

/// Resolve a raw fragment (with or without the leading `#`) to a view.
///
/// Empty and unrecognized fragments resolve to the dashboard.
#[must_use]
pub fn resolve_view(fragment: &str) -> ViewId {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    ViewId::from_fragment(fragment).unwrap_or_default()
}

/// What the shell should currently render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    /// The admin gate failed; show the login form.
    LoginGate,
    /// A protected view, with its nav entry highlighted.
    View(ViewId),
}

/// Entry loads fired when a view becomes active.
#[async_trait]
pub trait ViewLoaders: Send + Sync {
    /// Dashboard entry: stat cards, then the recent-products table.
    async fn load_dashboard_stats(&self);
    /// Dashboard entry, after the stats.
    async fn load_recent_products(&self);
    /// Products entry: the full listing.
    async fn load_product_list(&self);
}

/// Resolves fragments, gates protected views, and fires entry loads.
#[derive(Clone)]
pub struct ViewRouter {
    session: SessionManager,
    loaders: Arc<dyn ViewLoaders>,
    active: Arc<Mutex<ActiveView>>,
    nav: Arc<Mutex<ViewId>>,
}

impl ViewRouter {
    #[must_use]
    pub fn new(session: SessionManager, loaders: Arc<dyn ViewLoaders>) -> Self {
        Self {
            session,
            loaders,
            active: Arc::new(Mutex::new(ActiveView::LoginGate)),
            nav: Arc::new(Mutex::new(ViewId::Dashboard)),
        }
    }

    /// Handle a fragment change (navigation click, back/forward, page load).
    ///
    /// Every protected view entry re-runs the admin gate; a failed gate
    /// stores the attempted fragment for the post-login redirect and shows
    /// the login form instead.
    pub async fn handle_fragment(&self, fragment: &str) -> ActiveView {
        let view = resolve_view(fragment);

        if !self.session.require_admin(view.fragment()).await {
            let active = ActiveView::LoginGate;
            *lock(&self.active) = active;
            return active;
        }

        // The highlighted nav entry tracks the resolved view, not the raw
        // fragment, so fallback navigation highlights Dashboard.
        *lock(&self.nav) = view;
        let active = ActiveView::View(view);
        *lock(&self.active) = active;

        match view {
            ViewId::Dashboard => {
                self.loaders.load_dashboard_stats().await;
                self.loaders.load_recent_products().await;
            }
            ViewId::Products => self.loaders.load_product_list().await,
            ViewId::ProductForm | ViewId::Analytics => {}
        }

        tracing::debug!(?view, "view activated");
        active
    }

    /// The view the shell should render right now.
    #[must_use]
    pub fn active_view(&self) -> ActiveView {
        *lock(&self.active)
    }

    /// The nav entry to highlight.
    #[must_use]
    pub fn highlighted_nav(&self) -> ViewId {
        *lock(&self.nav)
    }
}
