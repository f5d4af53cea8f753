//! The full product listing and its per-row delete action.

use std::sync::{Arc, Mutex};

use velvet_lane_core::{Product, ProductId};

use crate::error::AdminError;
use crate::guard::{ActionGuard, ActionKey};
use crate::providers::{ListOrder, ProductStore};
use crate::sync::lock;
use crate::ui::{LoadingOverlay, NotificationCenter, Severity};

use super::DashboardController;

/// Loads the product table and handles row deletion.
///
/// Cloning shares the cached listing and the in-flight guard.
#[derive(Clone)]
pub struct ProductListController {
    store: Arc<dyn ProductStore>,
    overlay: LoadingOverlay,
    notifications: NotificationCenter,
    guard: ActionGuard,
    dashboard: DashboardController,
    cache: Arc<Mutex<Vec<Product>>>,
}

impl ProductListController {
    #[must_use]
    pub fn new(
        store: Arc<dyn ProductStore>,
        overlay: LoadingOverlay,
        notifications: NotificationCenter,
        guard: ActionGuard,
        dashboard: DashboardController,
    ) -> Self {
        Self {
            store,
            overlay,
            notifications,
            guard,
            dashboard,
            cache: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refresh the listing, newest first.
    pub async fn load(&self) {
        self.overlay.show_busy("Loading products...");
        let result = self.store.list(ListOrder::NewestFirst).await;
        self.overlay.clear_busy();

        match result {
            Ok(products) => *lock(&self.cache) = products,
            Err(e) => {
                tracing::error!(error = %e, "product list load failed");
                self.notifications
                    .notify("Failed to load products.", Severity::Error);
            }
        }
    }

    /// Look a product up in the cached listing (edit-form prefill).
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        lock(&self.cache).iter().find(|p| &p.id == id).cloned()
    }

    /// Snapshot of the cached listing.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.cache).clone()
    }

    /// Delete one product, then refresh the listing and the stat cards.
    ///
    /// A second delete for the same id while one is in flight is dropped
    /// silently. The refreshes run only after a successful delete, listing
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] when the backend rejects the
    /// delete; the user has already been notified.
    pub async fn delete(&self, id: &ProductId) -> Result<(), AdminError> {
        let Some(_in_flight) = self.guard.try_begin(ActionKey::DeleteProduct(id.clone())) else {
            tracing::debug!(%id, "delete already in flight");
            return Ok(());
        };

        self.overlay.show_busy("Deleting product...");
        let result = self.store.delete(id).await;
        self.overlay.clear_busy();

        if let Err(e) = result {
            tracing::error!(error = %e, %id, "delete failed");
            self.notifications
                .notify("Failed to delete product.", Severity::Error);
            return Err(AdminError::Persistence(e));
        }

        self.notifications
            .notify("Product deleted successfully", Severity::Success);
        self.load().await;
        self.dashboard.load_stats().await;
        Ok(())
    }
}
