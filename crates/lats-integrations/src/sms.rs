//! # SMS Gateway Client
//!
//! SMS goes through the backend proxy, which forwards to the gateway with
//! the credentials in the request body.
//!
//! ```text
//! SmsClient ──POST {phone, message, apiUrl, apiKey, apiPassword, senderId}──► proxy ──► gateway
//!           ◄──────────────── { success, error?, messageId? } ───────────────
//! ```
//!
//! Numbers starting with `255700` are reserved for testing: they succeed
//! without any HTTP call.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{IntegrationError, IntegrationResult};
use crate::http::VendorHttp;
use lats_core::validation::{is_test_phone, normalize_phone};
use lats_core::{Integration, IntegrationKind};

/// Gateway endpoint used when the integration sets none.
pub const DEFAULT_GATEWAY_URL: &str = "https://mshastra.com/sendurl.aspx";

/// Sender id used when the integration sets none.
pub const DEFAULT_SENDER_ID: &str = "LATS POS";

/// Gateway credentials and the proxy that relays to it.
#[derive(Clone, PartialEq, Eq)]
pub struct SmsConfig {
    pub proxy_url: String,
    pub gateway_url: String,
    pub api_key: String,
    pub api_password: Option<String>,
    pub sender_id: String,
}

impl SmsConfig {
    /// Reads the gateway settings from the `SMS_GATEWAY` row.
    pub fn from_integration(
        integration: Option<&Integration>,
        proxy_url: &str,
    ) -> IntegrationResult<Self> {
        let kind = IntegrationKind::SmsGateway;
        let integration =
            integration.ok_or_else(|| IntegrationError::not_configured(kind, "no integration saved"))?;

        if !integration.is_enabled {
            return Err(IntegrationError::not_configured(kind, "integration disabled"));
        }

        let api_key = integration
            .credential("api_key")
            .ok_or_else(|| IntegrationError::not_configured(kind, "missing api_key"))?;

        let api_password = integration
            .credential("api_password")
            .or_else(|| integration.credential("api_secret"))
            .map(str::to_string);

        Ok(SmsConfig {
            proxy_url: proxy_url.to_string(),
            gateway_url: integration
                .config_value("api_url")
                .unwrap_or(DEFAULT_GATEWAY_URL)
                .to_string(),
            api_key: api_key.to_string(),
            api_password,
            sender_id: integration
                .credential("sender_id")
                .unwrap_or(DEFAULT_SENDER_ID)
                .to_string(),
        })
    }
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("proxy_url", &self.proxy_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &crate::scrub::REDACTED)
            .field("sender_id", &self.sender_id)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    phone: &'a str,
    message: &'a str,
    api_url: &'a str,
    api_key: &'a str,
    api_password: Option<&'a str>,
    sender_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
}

/// Client for the SMS proxy.
#[derive(Debug, Clone)]
pub struct SmsClient {
    config: SmsConfig,
    http: VendorHttp,
}

impl SmsClient {
    pub fn new(config: SmsConfig, timeout: Duration) -> IntegrationResult<Self> {
        Ok(SmsClient {
            config,
            http: VendorHttp::new(timeout)?,
        })
    }

    pub fn from_integration(
        integration: Option<&Integration>,
        proxy_url: &str,
        timeout: Duration,
    ) -> IntegrationResult<Self> {
        Self::new(SmsConfig::from_integration(integration, proxy_url)?, timeout)
    }

    pub fn config(&self) -> &SmsConfig {
        &self.config
    }

    /// Sends one SMS. Returns the gateway message id when it reports one.
    pub async fn send(&self, phone: &str, message: &str) -> IntegrationResult<Option<String>> {
        let phone = normalize_phone(phone)?;

        if is_test_phone(&phone) {
            info!(phone = %phone, "Test number, SMS not sent");
            return Ok(None);
        }

        let request = ProxyRequest {
            phone: &phone,
            message,
            api_url: &self.config.gateway_url,
            api_key: &self.config.api_key,
            api_password: self.config.api_password.as_deref(),
            sender_id: &self.config.sender_id,
        };

        let response: ProxyResponse = match self.http.post(&self.config.proxy_url, &request).await {
            Ok(response) => response,
            Err(IntegrationError::Network(reason)) => {
                warn!(reason = %reason, "SMS proxy unreachable");
                return Err(IntegrationError::Network(format!(
                    "SMS proxy server not available: {}",
                    reason
                )));
            }
            Err(e) => return Err(e),
        };

        if response.success {
            info!(phone = %phone, "SMS sent");
            Ok(response.message_id)
        } else {
            Err(IntegrationError::Rejected(
                response.error.unwrap_or_else(|| "SMS sending failed".to_string()),
            ))
        }
    }
}
