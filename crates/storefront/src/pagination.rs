//! Load-more pagination over a fetched listing.
//!
//! The backend returns the full filtered listing; the storefront reveals it
//! a page at a time with a "load more" control rather than numbered pages.

use velvet_lane_core::Product;

/// Products revealed per "load more" click.
pub const PRODUCTS_PER_PAGE: usize = 12;

/// Reveals a listing one page at a time.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    items: Vec<Product>,
    shown: usize,
}

impl Pager {
    /// Start paging a fresh listing; the first page is revealed immediately.
    #[must_use]
    pub fn first_page(items: Vec<Product>) -> Self {
        let shown = items.len().min(PRODUCTS_PER_PAGE);
        Self { items, shown }
    }

    /// Reveal the next page. Returns the newly revealed slice.
    pub fn load_more(&mut self) -> &[Product] {
        let start = self.shown;
        self.shown = (self.shown + PRODUCTS_PER_PAGE).min(self.items.len());
        &self.items[start..self.shown]
    }

    /// Everything revealed so far.
    #[must_use]
    pub fn visible(&self) -> &[Product] {
        &self.items[..self.shown]
    }

    /// Whether a "load more" control should be shown.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.shown < self.items.len()
    }

    /// Total size of the underlying listing.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.items.len()
    }

    /// Replace the listing (new search or filter) and reveal its first page.
    pub fn reset(&mut self, items: Vec<Product>) {
        *self = Self::first_page(items);
    }
}

/// The result-count caption under the search box.
#[must_use]
pub fn products_count_caption(count: usize) -> String {
    if count == 1 {
        "1 product found".to_owned()
    } else {
        format!("{count} products found")
    }
}
