//! # Integration Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client built from the integrations row                                │
//! │       │  row missing / disabled / no credentials                       │
//! │       ├──────────────────────────────► NotConfigured (user-actionable) │
//! │       ▼                                                                 │
//! │  Phone normalised ────────────────────► InvalidPhone                   │
//! │       ▼                                                                 │
//! │  HTTP call                                                             │
//! │       ├── connect / timeout ──────────► Network                        │
//! │       ├── 4xx / 5xx ──────────────────► Http { status, message }       │
//! │       ├── body not understood ────────► Decode                         │
//! │       └── vendor said no ─────────────► Rejected                       │
//! │                                                                         │
//! │  Every variant becomes SendOutcome { success: false, error } at the   │
//! │  MessageChannel boundary.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lats_core::{IntegrationKind, ValidationError};
use thiserror::Error;

/// Result type for vendor calls.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Vendor integration errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntegrationError {
    /// The integration is missing, disabled or lacks credentials.
    #[error("{} not configured ({reason}). Configure it in Admin Settings → Integrations.", .kind.display_name())]
    NotConfigured {
        kind: IntegrationKind,
        reason: String,
    },

    /// Recipient number is unusable.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] ValidationError),

    /// Vendor answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never got an answer.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Vendor accepted the request but refused to deliver.
    #[error("{0}")]
    Rejected(String),
}

impl IntegrationError {
    pub fn not_configured(kind: IntegrationKind, reason: impl Into<String>) -> Self {
        IntegrationError::NotConfigured {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, IntegrationError::NotConfigured { .. })
    }
}

impl From<reqwest::Error> for IntegrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return IntegrationError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return IntegrationError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        // reqwest includes the full URL in its message; Green API URLs carry
        // the instance token.
        IntegrationError::Network(crate::scrub::scrub_text(&err.to_string()))
    }
}
