//! User-visible state holders: notifications, busy overlay, auth broadcast.
//!
//! These carry the state a rendering shell would observe; none of them talk
//! to the backend.

pub mod auth_state;
pub mod loading;
pub mod notifications;

pub use auth_state::{AuthUi, AuthUiState};
pub use loading::LoadingOverlay;
pub use notifications::{Notification, NotificationCenter, Severity};
