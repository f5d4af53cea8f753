//! Store-overview stat cards and the recent-products table.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use velvet_lane_core::{Product, format_currency};

use crate::providers::{ListOrder, ProductStore};
use crate::sync::lock;
use crate::ui::{LoadingOverlay, NotificationCenter, Severity};

/// Rows shown in the recent-products table.
pub const RECENT_LIMIT: usize = 5;

/// The four stat cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_products: usize,
    pub featured_products: usize,
    pub total_stock: i64,
    /// Inventory value: Σ price × stock over all products.
    pub total_value: Decimal,
}

impl DashboardStats {
    /// The inventory-value card caption, e.g. `$81.00`.
    #[must_use]
    pub fn total_value_caption(&self) -> String {
        format_currency(self.total_value)
    }
}

/// Aggregate the stat cards from a full product listing.
#[must_use]
pub fn compute_stats(products: &[Product]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_products: products.len(),
        ..DashboardStats::default()
    };
    for product in products {
        if product.featured {
            stats.featured_products += 1;
        }
        stats.total_stock += i64::from(product.stock);
        stats.total_value += product.price * Decimal::from(product.stock);
    }
    stats
}

/// Loads and caches the dashboard's overview data.
///
/// Cloning shares the cached stats and recent rows.
#[derive(Clone)]
pub struct DashboardController {
    store: Arc<dyn ProductStore>,
    overlay: LoadingOverlay,
    notifications: NotificationCenter,
    stats: Arc<Mutex<Option<DashboardStats>>>,
    recent: Arc<Mutex<Vec<Product>>>,
}

impl DashboardController {
    #[must_use]
    pub fn new(
        store: Arc<dyn ProductStore>,
        overlay: LoadingOverlay,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            store,
            overlay,
            notifications,
            stats: Arc::new(Mutex::new(None)),
            recent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refresh the stat cards from a full listing.
    ///
    /// Failures surface as one notification; the previous stats stay cached.
    pub async fn load_stats(&self) {
        self.overlay.show_busy("Loading store stats...");
        let result = self.store.list(ListOrder::Unordered).await;
        self.overlay.clear_busy();

        match result {
            Ok(products) => {
                *lock(&self.stats) = Some(compute_stats(&products));
            }
            Err(e) => {
                tracing::error!(error = %e, "stats load failed");
                self.notifications
                    .notify("Could not load store statistics.", Severity::Error);
            }
        }
    }

    /// Refresh the recent-products table (newest [`RECENT_LIMIT`] rows).
    pub async fn load_recent(&self) {
        match self.store.list(ListOrder::NewestFirst).await {
            Ok(mut products) => {
                products.truncate(RECENT_LIMIT);
                *lock(&self.recent) = products;
            }
            Err(e) => {
                tracing::error!(error = %e, "recent products load failed");
                self.notifications
                    .notify("Failed to load products.", Severity::Error);
            }
        }
    }

    /// The last successfully computed stats.
    #[must_use]
    pub fn stats(&self) -> Option<DashboardStats> {
        lock(&self.stats).clone()
    }

    /// The cached recent-products rows, newest first.
    #[must_use]
    pub fn recent_products(&self) -> Vec<Product> {
        lock(&self.recent).clone()
    }
}
