//! View controllers: one per dashboard surface.
//!
//! Controllers sit between the provider seams and the rendering shell. Every
//! operation wraps its own busy indicator and converts every failure into
//! exactly one user-visible notification; callers get a `Result` for
//! sequencing, not for error display.

mod dashboard;
mod form;
mod products;

pub use dashboard::{DashboardController, DashboardStats, RECENT_LIMIT, compute_stats};
pub use form::{ImageFile, ProductDraft, ProductFormController, object_name};
pub use products::ProductListController;
