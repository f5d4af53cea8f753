//! In-flight guard for rapid repeated triggers.
//!
//! The original dashboard relied on disabling the triggering control during
//! its own operation; a double-click on delete or a double submit could still
//! race. This guard enforces at most one outstanding operation per logical
//! action key.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use velvet_lane_core::ProductId;

use crate::sync::lock;

/// Logical action keys; one operation per key may be in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    /// Credential check in progress.
    Login,
    /// Product form submission (create or edit).
    SubmitProduct,
    /// Deletion of one specific product.
    DeleteProduct(ProductId),
}

/// Tracks which action keys currently have an operation in flight.
///
/// Cloning shares the tracked set.
#[derive(Debug, Clone, Default)]
pub struct ActionGuard {
    in_flight: Arc<Mutex<HashSet<ActionKey>>>,
}

impl ActionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to begin an operation for `key`.
    ///
    /// Returns `None` if an operation for the same key is already in flight.
    /// The returned token releases the key when dropped.
    #[must_use]
    pub fn try_begin(&self, key: ActionKey) -> Option<InFlight> {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.insert(key.clone()) {
            Some(InFlight {
                set: Arc::clone(&self.in_flight),
                key,
            })
        } else {
            None
        }
    }

    /// Whether an operation for `key` is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self, key: &ActionKey) -> bool {
        lock(&self.in_flight).contains(key)
    }
}

/// RAII token holding an action key.
#[derive(Debug)]
pub struct InFlight {
    set: Arc<Mutex<HashSet<ActionKey>>>,
    key: ActionKey,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.key);
    }
}
