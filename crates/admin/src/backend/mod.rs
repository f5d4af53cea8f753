//! REST client for the hosted backend.
//!
//! One client implements all three provider seams: auth (`/auth/v1`),
//! product rows (`/rest/v1/products`), and image objects (`/storage/v1`).
//! Uses `reqwest` 0.13 with the project's publishable key on every request
//! and the session's bearer token once signed in.
//!
//! The live session is held in memory only; a page reload starts logged out.

mod auth;
mod products;
mod storage;

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::AdminConfig;
use crate::providers::{ProviderError, ProviderSession};
use crate::sync::lock;

/// The storage bucket holding product images.
const IMAGE_BUCKET: &str = "products";

/// Client for the hosted backend.
///
/// Cheap to clone; clones share the HTTP pool and the cached session.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    http: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    session: Mutex<Option<StoredSession>>,
}

/// The in-memory session cache: the bearer token plus what we report to the
/// session layer.
#[derive(Clone)]
struct StoredSession {
    access_token: SecretString,
    session: ProviderSession,
}

impl BackendClient {
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            inner: Arc::new(BackendInner {
                http: reqwest::Client::new(),
                base_url: config.backend_url.clone(),
                anon_key: config.backend_anon_key.clone(),
                session: Mutex::new(None),
            }),
        }
    }

    /// Join a path onto the project base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Attach the publishable key and the strongest available bearer token.
    ///
    /// Before sign-in the publishable key doubles as the bearer, which is how
    /// the hosted backend expects anonymous requests.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = lock(&self.inner.session)
            .as_ref()
            .map_or_else(|| self.inner.anon_key.clone(), |s| s.access_token.clone());
        request
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
    }

    fn stored_session(&self) -> Option<StoredSession> {
        lock(&self.inner.session).clone()
    }

    fn store_session(&self, session: Option<StoredSession>) {
        *lock(&self.inner.session) = session;
    }
}

/// Error payload shape shared by the auth, rest, and storage services.
#[derive(Debug, serde::Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "unknown error".to_owned())
    }
}

/// Pass 2xx responses through; turn anything else into [`ProviderError::Api`].
async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: ErrorBody = response.json().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        message: body.message(),
    })
}
