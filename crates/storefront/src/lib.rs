//! Velvet Lane Storefront - public catalog library.
//!
//! Read-only access to the store's active products: filtered and sorted
//! catalog queries, the featured strip on the home page, and load-more
//! pagination. Everything writable lives in the admin crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod pagination;
pub mod telemetry;

pub use catalog::{CatalogClient, CatalogError, CatalogQuery, FEATURED_LIMIT, SortKey};
pub use config::StorefrontConfig;
pub use pagination::{PRODUCTS_PER_PAGE, Pager, products_count_caption};
