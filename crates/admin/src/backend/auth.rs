//! Identity operations against the backend's auth service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use velvet_lane_core::Email;

use crate::providers::{Identity, IdentityProvider, ProviderError, ProviderSession};

use super::{BackendClient, ErrorBody, StoredSession, expect_success};

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: WireUser,
}

#[derive(Deserialize)]
struct WireUser {
    id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
}

impl WireUser {
    fn into_identity(self) -> Result<Identity, ProviderError> {
        let email = Email::parse(&self.email)
            .map_err(|e| ProviderError::Malformed(format!("user email: {e}")))?;
        Ok(Identity {
            id: self.id,
            email,
            created_at: self.created_at,
        })
    }
}

/// Map an auth-service rejection onto the credential-failure variants.
///
/// The service names failures with stable error codes; the message text is
/// only a fallback for older deployments that predate the codes.
fn classify_auth_failure(status: u16, body: &ErrorBody) -> ProviderError {
    match body.error_code.as_deref() {
        Some("invalid_credentials") => return ProviderError::InvalidCredentials,
        Some("email_not_confirmed") => return ProviderError::UnverifiedAccount,
        _ => {}
    }
    let message = body.message();
    if message.contains("Invalid login credentials") {
        ProviderError::InvalidCredentials
    } else if message.contains("Email not confirmed") {
        ProviderError::UnverifiedAccount
    } else {
        ProviderError::Api { status, message }
    }
}

#[async_trait]
impl IdentityProvider for BackendClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .authed(self.inner.http.post(url))
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(classify_auth_failure(status.as_u16(), &body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let session = ProviderSession {
            identity: token.user.into_identity()?,
            created_at: Utc::now(),
        };
        self.store_session(Some(StoredSession {
            access_token: SecretString::from(token.access_token),
            session: session.clone(),
        }));
        tracing::debug!(user = %session.identity.email, "signed in");

        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
        // The session lives in memory only, so this never goes to the
        // network; a reload starts logged out.
        Ok(self.stored_session().map(|s| s.session))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if self.stored_session().is_none() {
            return Ok(());
        }

        let url = self.endpoint("auth/v1/logout")?;
        let result = async {
            let response = self.authed(self.inner.http.post(url)).send().await?;
            expect_success(response).await?;
            Ok(())
        }
        .await;

        // The local session is gone either way.
        self.store_session(None);
        result
    }
}
