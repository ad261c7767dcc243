//! # Green API WhatsApp Client
//!
//! Every Green API endpoint is addressed by instance id and token:
//!
//! ```text
//! {api_url}/waInstance{instance_id}/{method}/{api_token}
//!
//!   sendMessage       POST  { chatId: "255712345678@c.us", message }  → { idMessage }
//!   getStateInstance  GET                                             → { stateInstance }
//!   getSettings       GET                                             → { ...settings }
//!   setSettings       POST  { ...settings }                           → { saveSettings }
//! ```
//!
//! Credentials come from the `WHATSAPP_GREEN_API` row of the integrations
//! table (`instance_id`, `api_token`; optional `api_url` in config).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{IntegrationError, IntegrationResult};
use crate::http::VendorHttp;
use lats_core::validation::normalize_phone;
use lats_core::{Integration, IntegrationKind};

/// Connection details of one Green API instance.
#[derive(Clone, PartialEq, Eq)]
pub struct GreenApiConfig {
    pub api_url: String,
    pub instance_id: String,
    pub api_token: String,
}

impl GreenApiConfig {
    /// Reads the instance from its integrations row.
    ///
    /// `default_api_url` is used when the row carries no `api_url`.
    pub fn from_integration(
        integration: Option<&Integration>,
        default_api_url: &str,
    ) -> IntegrationResult<Self> {
        let kind = IntegrationKind::WhatsappGreenApi;
        let integration =
            integration.ok_or_else(|| IntegrationError::not_configured(kind, "no integration saved"))?;

        if !integration.is_enabled {
            return Err(IntegrationError::not_configured(kind, "integration disabled"));
        }

        let instance_id = integration
            .credential("instance_id")
            .ok_or_else(|| IntegrationError::not_configured(kind, "missing instance_id"))?;
        let api_token = integration
            .credential("api_token")
            .ok_or_else(|| IntegrationError::not_configured(kind, "missing api_token"))?;
        let api_url = integration.config_value("api_url").unwrap_or(default_api_url);

        Ok(GreenApiConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            instance_id: instance_id.to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/waInstance{}/{}/{}",
            self.api_url, self.instance_id, method, self.api_token
        )
    }
}

impl std::fmt::Debug for GreenApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreenApiConfig")
            .field("api_url", &self.api_url)
            .field("instance_id", &self.instance_id)
            .field("api_token", &crate::scrub::REDACTED)
            .finish()
    }
}

/// Authorisation state reported by `getStateInstance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    /// e.g. `authorized`, `notAuthorized`, `blocked`, `starting`.
    pub state_instance: String,
}

impl InstanceState {
    pub fn is_authorized(&self) -> bool {
        self.state_instance == "authorized"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    chat_id: String,
    message: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    id_message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSettingsResponse {
    save_settings: bool,
}

/// Client for one Green API instance.
#[derive(Debug, Clone)]
pub struct GreenApiClient {
    config: GreenApiConfig,
    http: VendorHttp,
}

impl GreenApiClient {
    pub fn new(config: GreenApiConfig, timeout: Duration) -> IntegrationResult<Self> {
        Ok(GreenApiClient {
            config,
            http: VendorHttp::new(timeout)?,
        })
    }

    /// Builds a client straight from the integrations row.
    pub fn from_integration(
        integration: Option<&Integration>,
        default_api_url: &str,
        timeout: Duration,
    ) -> IntegrationResult<Self> {
        Self::new(GreenApiConfig::from_integration(integration, default_api_url)?, timeout)
    }

    pub fn config(&self) -> &GreenApiConfig {
        &self.config
    }

    /// Sends a text message and returns the vendor's message id.
    pub async fn send_message(&self, phone: &str, text: &str) -> IntegrationResult<String> {
        let digits = normalize_phone(phone)?;
        let request = SendMessageRequest {
            chat_id: format!("{}@c.us", digits),
            message: text,
        };

        let response: SendMessageResponse = self
            .http
            .post(&self.config.endpoint("sendMessage"), &request)
            .await?;

        info!(chat_id = %request.chat_id, id_message = %response.id_message, "WhatsApp message sent");
        Ok(response.id_message)
    }

    pub async fn get_state_instance(&self) -> IntegrationResult<InstanceState> {
        let state: InstanceState = self.http.get(&self.config.endpoint("getStateInstance")).await?;
        debug!(state = %state.state_instance, "Green API instance state");
        Ok(state)
    }

    /// Instance settings as the vendor returns them.
    pub async fn get_settings(&self) -> IntegrationResult<Map<String, Value>> {
        self.http.get(&self.config.endpoint("getSettings")).await
    }

    /// Updates instance settings; only the given keys change.
    pub async fn set_settings(&self, settings: &Map<String, Value>) -> IntegrationResult<()> {
        let response: SaveSettingsResponse = self
            .http
            .post(&self.config.endpoint("setSettings"), settings)
            .await?;

        if response.save_settings {
            Ok(())
        } else {
            Err(IntegrationError::Rejected(
                "Green API did not save the settings".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn integration(credentials: Value, config: Value, enabled: bool) -> Integration {
        let as_map = |v: Value| match v {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Integration {
            kind: IntegrationKind::WhatsappGreenApi,
            is_enabled: enabled,
            credentials: as_map(credentials),
            config: as_map(config),
        }
    }

    #[test]
    fn test_config_from_integration() {
        let row = integration(
            json!({"instance_id": "1101", "api_token": "tok"}),
            json!({"api_url": "https://7103.api.green-api.com/"}),
            true,
        );
        let config = GreenApiConfig::from_integration(Some(&row), "https://api.green-api.com").unwrap();

        assert_eq!(config.api_url, "https://7103.api.green-api.com");
        assert_eq!(
            config.endpoint("sendMessage"),
            "https://7103.api.green-api.com/waInstance1101/sendMessage/tok"
        );
    }

    #[test]
    fn test_missing_pieces_are_not_configured() {
        let default_url = "https://api.green-api.com";

        let err = GreenApiConfig::from_integration(None, default_url).unwrap_err();
        assert!(err.is_not_configured());

        let disabled = integration(json!({"instance_id": "1", "api_token": "t"}), json!({}), false);
        assert!(GreenApiConfig::from_integration(Some(&disabled), default_url)
            .unwrap_err()
            .is_not_configured());

        let blank_token = integration(json!({"instance_id": "1", "api_token": "  "}), json!({}), true);
        let err = GreenApiConfig::from_integration(Some(&blank_token), default_url).unwrap_err();
        assert!(err.to_string().contains("missing api_token"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = GreenApiConfig {
            api_url: "https://api.green-api.com".into(),
            instance_id: "1".into(),
            api_token: "very-secret".into(),
        };
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
