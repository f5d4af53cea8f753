//! Tracing subscriber setup for embedding shells and tests.

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set. Safe to
/// call more than once; later calls are no-ops.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "velvet_lane_storefront=info".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
