//! HTTP plumbing shared by the vendor clients.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{IntegrationError, IntegrationResult};
use crate::scrub::scrub_url;

/// Thin JSON-over-HTTP wrapper around a reqwest client.
#[derive(Debug, Clone)]
pub(crate) struct VendorHttp {
    client: Client,
}

impl VendorHttp {
    pub(crate) fn new(timeout: Duration) -> IntegrationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(VendorHttp { client })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> IntegrationResult<T> {
        debug!(url = %scrub_url(url), "GET");
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> IntegrationResult<T> {
        debug!(url = %scrub_url(url), "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Maps error statuses to [`IntegrationError::Http`], preferring the
    /// vendor's own `message`/`error` field when the body is JSON.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> IntegrationResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|body| {
                    ["message", "error"]
                        .iter()
                        .find_map(|key| body.get(*key).and_then(|v| v.as_str()).map(str::to_string))
                })
                .unwrap_or_else(|| {
                    if text.trim().is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        text
                    }
                });
            return Err(IntegrationError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(Into::into)
    }
}
