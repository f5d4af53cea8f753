//! Catalog queries against the backend's `products` resource.
//!
//! Read-only PostgREST access. Every query pins `active=eq.true`; inactive
//! products never reach the storefront regardless of the other filters.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use velvet_lane_core::Product;

use crate::config::StorefrontConfig;

/// Products shown in the home-page featured strip.
pub const FEATURED_LIMIT: usize = 6;

/// Errors from catalog queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A configured or joined endpoint URL was invalid.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The backend answered 2xx but the body was not a product listing.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently added first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl SortKey {
    /// The PostgREST `order` parameter value.
    #[must_use]
    const fn order_param(self) -> &'static str {
        match self {
            Self::Newest => "created_at.desc",
            Self::PriceAsc => "price.asc",
            Self::PriceDesc => "price.desc",
            Self::TitleAsc => "title.asc",
        }
    }
}

/// A catalog listing request: free-text search, category filter, sort, and
/// an optional row limit.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Exact category filter.
    pub category: Option<String>,
    pub sort: SortKey,
    /// Restrict to the featured strip.
    pub featured_only: bool,
    pub limit: Option<usize>,
}

impl CatalogQuery {
    /// Translate to backend query parameters.
    ///
    /// Blank search terms and categories are dropped rather than sent as
    /// empty filters.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("select".to_owned(), "*".to_owned()),
            ("active".to_owned(), "eq.true".to_owned()),
        ];
        if let Some(term) = self.search.as_deref().map(str::trim)
            && !term.is_empty()
        {
            pairs.push(("title".to_owned(), format!("ilike.*{term}*")));
        }
        if let Some(category) = self.category.as_deref().map(str::trim)
            && !category.is_empty()
        {
            pairs.push(("category".to_owned(), format!("eq.{category}")));
        }
        if self.featured_only {
            pairs.push(("featured".to_owned(), "eq.true".to_owned()));
        }
        pairs.push(("order".to_owned(), self.sort.order_param().to_owned()));
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        pairs
    }
}

/// Read-only client for the public catalog.
///
/// Cheap to clone; clones share the HTTP pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    http: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

impl CatalogClient {
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                http: reqwest::Client::new(),
                base_url: config.backend_url.clone(),
                anon_key: config.backend_anon_key.clone(),
            }),
        }
    }

    /// Run a catalog query.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the request fails or the response is
    /// not a product listing.
    pub async fn products(&self, query: &CatalogQuery) -> Result<Vec<Product>, CatalogError> {
        let mut url = self.inner.base_url.join("rest/v1/products")?;
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());

        let response = self
            .inner
            .http
            .get(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.anon_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "catalog query failed");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))
    }

    /// The home-page featured strip: newest featured products, at most
    /// [`FEATURED_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the request fails.
    pub async fn featured_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.products(&CatalogQuery {
            featured_only: true,
            limit: Some(FEATURED_LIMIT),
            ..CatalogQuery::default()
        })
        .await
    }
}
