//! # Message Channels
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Messenger                                                              │
//! │    WHATSAPP_GREEN_API ──► Ok(GreenApiClient)  ──► send ──► SendOutcome │
//! │    SMS_GATEWAY        ──► Ok(SmsClient)       ──► send ──► SendOutcome │
//! │    EMAIL              ──► Err(NotConfigured)  ────────────► SendOutcome │
//! │                                                  { success: false }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Clients are built once from the integrations table. A kind whose client
//! could not be built keeps the build error, and every send to it fails
//! with that error without touching the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::email::EmailStub;
use crate::error::{IntegrationError, IntegrationResult};
use crate::green_api::GreenApiClient;
use crate::sms::SmsClient;
use lats_core::{IntegrationKind, SendOutcome};

/// One way of reaching a customer.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn kind(&self) -> IntegrationKind;

    /// Sends `body` to `to`. Never fails; vendor errors land in the outcome.
    async fn send(&self, to: &str, body: &str) -> SendOutcome;
}

#[async_trait]
impl MessageChannel for GreenApiClient {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::WhatsappGreenApi
    }

    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        self.send_message(to, body).await.map(Some).into()
    }
}

#[async_trait]
impl MessageChannel for SmsClient {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::SmsGateway
    }

    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        SmsClient::send(self, to, body).await.into()
    }
}

#[async_trait]
impl MessageChannel for EmailStub {
    fn kind(&self) -> IntegrationKind {
        IntegrationKind::Email
    }

    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        EmailStub::send(self, to, body).await.into()
    }
}

/// Routes sends to the channel for each integration kind.
#[derive(Default)]
pub struct Messenger {
    channels: HashMap<IntegrationKind, Result<Arc<dyn MessageChannel>, IntegrationError>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the outcome of building a client for `kind`.
    pub fn install<C>(&mut self, kind: IntegrationKind, client: IntegrationResult<C>)
    where
        C: MessageChannel + 'static,
    {
        let entry = match client {
            Ok(client) => {
                debug!(kind = %kind, "Message channel ready");
                Ok(Arc::new(client) as Arc<dyn MessageChannel>)
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Message channel unavailable");
                Err(e)
            }
        };
        self.channels.insert(kind, entry);
    }

    pub fn with<C>(mut self, kind: IntegrationKind, client: IntegrationResult<C>) -> Self
    where
        C: MessageChannel + 'static,
    {
        self.install(kind, client);
        self
    }

    pub fn is_configured(&self, kind: IntegrationKind) -> bool {
        matches!(self.channels.get(&kind), Some(Ok(_)))
    }

    pub async fn send(&self, kind: IntegrationKind, to: &str, body: &str) -> SendOutcome {
        match self.channels.get(&kind) {
            Some(Ok(channel)) => channel.send(to, body).await,
            Some(Err(e)) => SendOutcome::failed(e.to_string()),
            None => SendOutcome::failed(
                IntegrationError::not_configured(kind, "no integration saved").to_string(),
            ),
        }
    }
}

impl std::fmt::Debug for Messenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<(&str, bool)> = self
            .channels
            .iter()
            .map(|(kind, entry)| (kind.key(), entry.is_ok()))
            .collect();
        kinds.sort();
        f.debug_struct("Messenger").field("channels", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recording {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MessageChannel for Recording {
        fn kind(&self) -> IntegrationKind {
            IntegrationKind::SmsGateway
        }

        async fn send(&self, _to: &str, _body: &str) -> SendOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SendOutcome::sent(Some("m-1".into()))
        }
    }

    #[tokio::test]
    async fn test_routes_to_installed_channel() {
        let calls = Arc::new(AtomicUsize::new(0));
        let messenger = Messenger::new().with(
            IntegrationKind::SmsGateway,
            Ok(Recording { calls: calls.clone() }),
        );

        let outcome = messenger.send(IntegrationKind::SmsGateway, "255712345678", "hi").await;

        assert!(outcome.success);
        assert_eq!(outcome.message_id.as_deref(), Some("m-1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_kinds_fail_without_sending() {
        let messenger = Messenger::new().with::<Recording>(
            IntegrationKind::WhatsappGreenApi,
            Err(IntegrationError::not_configured(
                IntegrationKind::WhatsappGreenApi,
                "integration disabled",
            )),
        );

        assert!(!messenger.is_configured(IntegrationKind::WhatsappGreenApi));

        let outcome = messenger
            .send(IntegrationKind::WhatsappGreenApi, "255712345678", "hi")
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("integration disabled"));

        let outcome = messenger.send(IntegrationKind::SmsGateway, "255712345678", "hi").await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("SMS not configured (no integration saved). Configure it in Admin Settings → Integrations.")
        );
    }

    #[tokio::test]
    async fn test_email_stub_reports_not_configured() {
        let messenger = Messenger::new().with(IntegrationKind::Email, Ok(EmailStub::new()));
        assert!(messenger.is_configured(IntegrationKind::Email));

        let outcome = messenger.send(IntegrationKind::Email, "a@b.co", "hi").await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().starts_with("Email not configured"));
    }
}
