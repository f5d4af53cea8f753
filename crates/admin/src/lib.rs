//! Velvet Lane Admin - dashboard application library.
//!
//! Everything here is client-side state over a hosted backend: the backend
//! owns persistence, file storage, and identity; this crate owns the session
//! lifecycle, view routing, and the CRUD flows of the admin dashboard.
//!
//! # Architecture
//!
//! - [`session::SessionManager`] - single current identity plus a rolling
//!   one-hour expiry timer, gating every admin view
//! - [`router::ViewRouter`] - location fragment to exactly one visible view,
//!   with per-view data loads
//! - [`backend::BackendClient`] - reqwest client for the hosted backend
//!   (auth, `products` resource, object storage)
//! - [`controllers`] - dashboard stats, product list, and product form flows
//! - [`ui`] - notification queue, busy overlay, auth-state broadcast
//!
//! The backend is reached only through the seams in [`providers`], so every
//! flow is testable against in-memory fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod backend;
pub mod clock;
pub mod config;
pub mod controllers;
pub mod error;
pub mod guard;
pub mod providers;
pub mod router;
pub mod session;
pub mod telemetry;
pub mod ui;

pub(crate) mod sync;

pub use app::AdminApp;
pub use config::AdminConfig;
pub use error::{AdminError, AuthFailureKind};
