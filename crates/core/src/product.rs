//! Product records as stored by the hosted backend.
//!
//! The backend owns and persists these; the clients only read, insert,
//! update, and delete whole records. Field names follow the backend's
//! `products` resource.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A product row as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend-assigned id.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Units in stock.
    #[serde(default)]
    pub stock: i32,
    /// Category label used for filtering.
    pub category: String,
    /// Shown in the featured strip on the home page.
    #[serde(default)]
    pub featured: bool,
    /// Inactive products are hidden from the storefront.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Public URL of the product image, if one was uploaded.
    #[serde(default)]
    pub image: Option<String>,
    /// Row creation time, set by the backend.
    pub created_at: DateTime<Utc>,
}

/// The writable portion of a product: everything the backend does not own.
///
/// Used both for inserts and for whole-record updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// The writable record carrying this product's current field values.
    #[must_use]
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            category: self.category.clone(),
            featured: self.featured,
            active: self.active,
            image: self.image.clone(),
        }
    }
}
