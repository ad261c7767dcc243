//! Email placeholder. No provider is wired up yet, so every send reports
//! the integration as not configured.

use tracing::info;

use crate::error::{IntegrationError, IntegrationResult};
use lats_core::IntegrationKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmailStub;

impl EmailStub {
    pub fn new() -> Self {
        EmailStub
    }

    pub async fn send(&self, to: &str, subject: &str) -> IntegrationResult<Option<String>> {
        info!(to = %to, subject = %subject, "Email requested but no provider is configured");
        Err(IntegrationError::not_configured(
            IntegrationKind::Email,
            "no email provider",
        ))
    }
}
