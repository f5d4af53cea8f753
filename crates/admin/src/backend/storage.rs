//! Product image uploads via the backend's storage service.

use async_trait::async_trait;
use url::Url;

use crate::providers::{ObjectStore, ProviderError};

use super::{BackendClient, IMAGE_BUCKET, expect_success};

/// The publicly resolvable URL for an uploaded object.
///
/// The bucket is public-read, so this is a plain path join rather than a
/// signed URL.
fn public_url(base: &Url, name: &str) -> Result<String, ProviderError> {
    let url = base.join(&format!("storage/v1/object/public/{IMAGE_BUCKET}/{name}"))?;
    Ok(url.into())
}

#[async_trait]
impl ObjectStore for BackendClient {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProviderError> {
        let url = self.endpoint(&format!("storage/v1/object/{IMAGE_BUCKET}/{name}"))?;
        let response = self
            .authed(self.inner.http.post(url))
            .header("Content-Type", content_type.to_owned())
            .body(bytes)
            .send()
            .await?;
        expect_success(response).await?;

        public_url(&self.inner.base_url, name)
    }
}
