//! Product rows via the backend's REST service.
//!
//! The service speaks PostgREST conventions: filters and ordering are query
//! parameters (`id=eq.{id}`, `order=created_at.desc`) and writes return the
//! stored row when asked via `Prefer: return=representation`.

use async_trait::async_trait;

use velvet_lane_core::{Product, ProductId, ProductRecord};

use crate::providers::{ListOrder, ProductStore, ProviderError};

use super::{BackendClient, expect_success};

const PRODUCTS_PATH: &str = "rest/v1/products";

/// Writes return exactly one row; anything else is a contract violation.
fn single_row(mut rows: Vec<Product>) -> Result<Product, ProviderError> {
    if rows.len() != 1 {
        return Err(ProviderError::Malformed(format!(
            "expected one returned row, got {}",
            rows.len()
        )));
    }
    Ok(rows.remove(0))
}

#[async_trait]
impl ProductStore for BackendClient {
    async fn list(&self, order: ListOrder) -> Result<Vec<Product>, ProviderError> {
        let mut url = self.endpoint(PRODUCTS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            if order == ListOrder::NewestFirst {
                pairs.append_pair("order", "created_at.desc");
            }
        }

        let response = self.authed(self.inner.http.get(url)).send().await?;
        let rows = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(rows)
    }

    async fn insert(&self, record: &ProductRecord) -> Result<Product, ProviderError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        let response = self
            .authed(self.inner.http.post(url))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        let rows: Vec<Product> = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        single_row(rows)
    }

    async fn update(
        &self,
        id: &ProductId,
        record: &ProductRecord,
    ) -> Result<Product, ProviderError> {
        let mut url = self.endpoint(PRODUCTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .authed(self.inner.http.patch(url))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        let rows: Vec<Product> = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        single_row(rows)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ProviderError> {
        let mut url = self.endpoint(PRODUCTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self.authed(self.inner.http.delete(url)).send().await?;
        expect_success(response).await?;
        Ok(())
    }
}
