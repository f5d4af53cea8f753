//! Velvet Lane Core - Shared types library.
//!
//! This crate provides the common types used across the Velvet Lane
//! components:
//! - `storefront` - Public-facing catalog client
//! - `admin` - Admin dashboard application
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Product
//! records are owned and persisted by the hosted backend; this crate just
//! describes their shape.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod product;
pub mod types;

pub use product::{Product, ProductRecord};
pub use types::*;
