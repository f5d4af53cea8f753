//! Provider seams for the hosted backend.
//!
//! The backend is an external collaborator: identity, persistence, and file
//! storage are all delegated to it. These traits are the whole surface the
//! dashboard depends on, so the flows can be exercised against in-memory
//! fakes. None of the operations carry a retry policy - failures surface
//! immediately at the initiating action.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use velvet_lane_core::{Email, Product, ProductId, ProductRecord};

/// An authenticated user record as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned user id.
    pub id: Uuid,
    /// The account's email address.
    pub email: Email,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// A live provider session: an identity plus when the session was created.
///
/// The session creation time is what the client-side age check runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
}

/// Errors reported by the hosted backend.
///
/// Credential failures are classified here, at the client boundary, so the
/// session layer never string-matches provider messages.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The email/password pair was rejected.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// The account exists but its email address is unconfirmed.
    #[error("email address has not been confirmed")]
    UnverifiedAccount,

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A configured or joined endpoint URL was invalid.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The backend answered 2xx but the body was not what we expect.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Requested ordering for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListOrder {
    /// Most recently created first (the dashboard table order).
    #[default]
    NewestFirst,
    /// Whatever order the backend returns; used for aggregation.
    Unordered,
}

/// Session-based identity operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidCredentials`] or
    /// [`ProviderError::UnverifiedAccount`] for rejected accounts, or a
    /// transport/API error otherwise.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// The provider's live session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot report its session state.
    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError>;

    /// Invalidate the live session.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the sign-out. Callers that
    /// must converge to a logged-out state log and discard this.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// CRUD over the backend's `products` resource.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list(&self, order: ListOrder) -> Result<Vec<Product>, ProviderError>;

    /// Insert a new product and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; no partial state is left behind.
    async fn insert(&self, record: &ProductRecord) -> Result<Product, ProviderError>;

    /// Replace the writable fields of an existing product.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the row does not exist.
    async fn update(&self, id: &ProductId, record: &ProductRecord)
    -> Result<Product, ProviderError>;

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete(&self, id: &ProductId) -> Result<(), ProviderError>;
}

/// Binary object storage for product images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object and return its publicly resolvable URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails. A failed upload must abort the
    /// surrounding flow before any record write.
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProviderError>;
}
