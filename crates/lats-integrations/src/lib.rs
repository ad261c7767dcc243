//! # lats-integrations: Messaging Vendor Clients
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         lats-integrations                               │
//! │                                                                         │
//! │   integrations row (lats-db)                                            │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐               │
//! │   │GreenApiClient│   │  SmsClient   │   │  EmailStub   │               │
//! │   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘               │
//! │          └──────────────────┼──────────────────┘                        │
//! │                             ▼                                           │
//! │                 MessageChannel → SendOutcome                            │
//! │                                                                         │
//! │   scrub: secrets are removed from anything logged                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod channel;
pub mod email;
pub mod error;
pub mod green_api;
mod http;
pub mod scrub;
pub mod sms;

pub use channel::{MessageChannel, Messenger};
pub use email::EmailStub;
pub use error::{IntegrationError, IntegrationResult};
pub use green_api::{GreenApiClient, GreenApiConfig, InstanceState};
pub use sms::{SmsClient, SmsConfig};
