//! # Domain Types
//!
//! Types shared across the service layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ChildVariant   │   │   SyncReport    │   │  SendOutcome    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  success        │   │  success        │       │
//! │  │  parent_id      │   │  errors[]       │   │  error?         │       │
//! │  │  quantity       │   │  refreshed[]    │   │  message_id?    │       │
//! │  │  price_cents    │   │  duration (ms)  │   └─────────────────┘       │
//! │  │  attributes{}   │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   SyncDomain    │   │  Integration    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Caches         │   │  name           │                              │
//! │  │  Inventory ...  │   │  is_enabled     │                              │
//! │  │  Auxiliary      │   │  credentials{}  │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Product
// =============================================================================

/// A product listed in a branch's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Branch that stocks this product.
    pub branch_id: String,

    /// Display name.
    pub name: String,

    /// Stock Keeping Unit, if assigned.
    pub sku: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last modified.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Branch Record
// =============================================================================

/// A branch-scoped document (POS settings, purchase order, customer, admin
/// setting). The payload is kept as JSON because each screen owns its own
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BranchRecord {
    /// Unique identifier.
    pub id: String,

    /// Owning branch.
    pub branch_id: String,

    /// Document body.
    #[ts(type = "Record<string, unknown>")]
    pub data: Map<String, Value>,

    /// When the document was last modified.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Child Variant
// =============================================================================

/// A serialised child of a product variant (one physical unit, e.g. an IMEI).
///
/// Children are what the POS shows when a cashier picks "which phone" out of
/// a parent variant. They are preloaded in bulk and grouped by `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChildVariant {
    /// Unique identifier.
    pub id: String,

    /// Parent variant this unit belongs to.
    pub parent_id: String,

    /// Display name (variant name, falling back to the base name).
    pub name: String,

    /// Stock Keeping Unit, if assigned.
    pub sku: Option<String>,

    /// Units on hand (always > 0 for preloaded children).
    pub quantity: i64,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Free-form attributes (imei, serial_number, condition, ...).
    #[ts(type = "Record<string, unknown>")]
    pub attributes: Map<String, Value>,

    /// When the unit was recorded.
    pub created_at: DateTime<Utc>,
}

impl ChildVariant {
    /// Returns a string attribute, if present.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Returns the IMEI for serialised phones.
    pub fn imei(&self) -> Option<&str> {
        self.attribute_str("imei")
    }
}

// =============================================================================
// Sync Domain
// =============================================================================

/// One step of a branch switch, in execution order.
///
/// ## Step Order
/// ```text
/// Caches → Inventory → PointOfSale → PurchaseOrders → Customers
///        → AdminSettings → Auxiliary
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SyncDomain {
    /// Cache invalidation fan-out.
    Caches,
    /// Products and stock levels.
    Inventory,
    /// Point-of-sale settings and register state.
    PointOfSale,
    /// Purchase orders.
    PurchaseOrders,
    /// Customers and global data.
    Customers,
    /// Admin settings.
    AdminSettings,
    /// Auxiliary sync triggers (child variant preload, ...).
    Auxiliary,
}

impl SyncDomain {
    /// All steps in execution order.
    pub const ALL: [SyncDomain; 7] = [
        SyncDomain::Caches,
        SyncDomain::Inventory,
        SyncDomain::PointOfSale,
        SyncDomain::PurchaseOrders,
        SyncDomain::Customers,
        SyncDomain::AdminSettings,
        SyncDomain::Auxiliary,
    ];

    /// Stable name used in `SyncReport::refreshed_stores`.
    pub const fn name(&self) -> &'static str {
        match self {
            SyncDomain::Caches => "caches",
            SyncDomain::Inventory => "inventory",
            SyncDomain::PointOfSale => "pos",
            SyncDomain::PurchaseOrders => "purchase_orders",
            SyncDomain::Customers => "customers",
            SyncDomain::AdminSettings => "admin_settings",
            SyncDomain::Auxiliary => "auxiliary",
        }
    }

    /// Prefix of the error message recorded when this step fails.
    pub const fn failure_label(&self) -> &'static str {
        match self {
            SyncDomain::Caches => "Failed to clear caches",
            SyncDomain::Inventory => "Failed to refresh inventory",
            SyncDomain::PointOfSale => "Failed to refresh POS data",
            SyncDomain::PurchaseOrders => "Failed to refresh purchase orders",
            SyncDomain::Customers => "Failed to refresh customer data",
            SyncDomain::AdminSettings => "Failed to refresh admin settings",
            SyncDomain::Auxiliary => "Failed to trigger auxiliary sync",
        }
    }
}

impl std::fmt::Display for SyncDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SyncDomain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncDomain::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| CoreError::UnknownSyncDomain(s.to_string()))
    }
}

// =============================================================================
// Sync Report
// =============================================================================

/// Outcome of one branch switch.
///
/// Produced once per invocation and never persisted. Partial failure is a
/// normal outcome: the caller reads `errors` and decides what to do.
///
/// ## Serialization
/// ```json
/// {
///   "success": false,
///   "errors": ["Failed to refresh inventory: connection reset"],
///   "refreshedStores": ["caches", "pos", "purchase_orders"],
///   "duration": 184
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncReport {
    /// True only when `errors` is empty.
    pub success: bool,

    /// One message per failed step, in call order.
    pub errors: Vec<String>,

    /// Names of the steps that completed, in call order.
    pub refreshed_stores: Vec<String>,

    /// Elapsed wall-clock time in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

/// Accumulates step outcomes while a sync runs.
#[derive(Debug, Default)]
pub struct SyncReportBuilder {
    errors: Vec<String>,
    refreshed: Vec<String>,
}

impl SyncReportBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed step.
    pub fn record_success(&mut self, domain: SyncDomain) {
        self.refreshed.push(domain.name().to_string());
    }

    /// Records a failed step with a step-specific message.
    pub fn record_failure(&mut self, domain: SyncDomain, error: impl std::fmt::Display) {
        self.errors
            .push(format!("{}: {}", domain.failure_label(), error));
    }

    /// Number of failures recorded so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Freezes the report.
    pub fn finish(self, duration_ms: u64) -> SyncReport {
        SyncReport {
            success: self.errors.is_empty(),
            errors: self.errors,
            refreshed_stores: self.refreshed,
            duration_ms,
        }
    }
}

// =============================================================================
// Send Outcome
// =============================================================================

/// Normalised result of a vendor call (WhatsApp, SMS, email).
///
/// Every vendor wrapper returns this shape instead of an error so that the
/// UI can show one toast per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SendOutcome {
    /// Whether the vendor accepted the request.
    pub success: bool,

    /// Error message when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,

    /// Vendor message id when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message_id: Option<String>,
}

impl SendOutcome {
    /// Successful send with an optional vendor message id.
    pub fn sent(message_id: Option<String>) -> Self {
        SendOutcome {
            success: true,
            error: None,
            message_id,
        }
    }

    /// Failed send.
    pub fn failed(error: impl Into<String>) -> Self {
        SendOutcome {
            success: false,
            error: Some(error.into()),
            message_id: None,
        }
    }
}

impl<E: std::fmt::Display> From<Result<Option<String>, E>> for SendOutcome {
    fn from(result: Result<Option<String>, E>) -> Self {
        match result {
            Ok(message_id) => SendOutcome::sent(message_id),
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }
}

// =============================================================================
// Integrations
// =============================================================================

/// Supported third-party integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum IntegrationKind {
    /// WhatsApp via Green API.
    WhatsappGreenApi,
    /// SMS gateway (through the backend proxy).
    SmsGateway,
    /// Outbound email.
    Email,
}

impl IntegrationKind {
    /// Key used in the `integrations` table.
    pub const fn key(&self) -> &'static str {
        match self {
            IntegrationKind::WhatsappGreenApi => "WHATSAPP_GREEN_API",
            IntegrationKind::SmsGateway => "SMS_GATEWAY",
            IntegrationKind::Email => "EMAIL",
        }
    }

    /// Human-readable name for user-facing messages.
    pub const fn display_name(&self) -> &'static str {
        match self {
            IntegrationKind::WhatsappGreenApi => "WhatsApp",
            IntegrationKind::SmsGateway => "SMS",
            IntegrationKind::Email => "Email",
        }
    }
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for IntegrationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WHATSAPP_GREEN_API" => Ok(IntegrationKind::WhatsappGreenApi),
            "SMS_GATEWAY" => Ok(IntegrationKind::SmsGateway),
            "EMAIL" => Ok(IntegrationKind::Email),
            other => Err(CoreError::UnknownIntegration(other.to_string())),
        }
    }
}

/// A configured integration as stored by the admin settings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    /// Which integration this row configures.
    pub kind: IntegrationKind,

    /// Admin toggle.
    pub is_enabled: bool,

    /// Secrets (api keys, tokens, passwords).
    pub credentials: Map<String, Value>,

    /// Non-secret settings (api_url, sender id, ...).
    pub config: Map<String, Value>,
}

impl Integration {
    /// Returns a non-empty credential value.
    pub fn credential(&self, key: &str) -> Option<&str> {
        Self::non_empty(&self.credentials, key)
    }

    /// Returns a non-empty config value.
    pub fn config_value(&self, key: &str) -> Option<&str> {
        Self::non_empty(&self.config, key)
    }

    fn non_empty<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
