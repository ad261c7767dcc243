//! # lats-core: Pure Domain Types for the LATS POS Service Layer
//!
//! Shared types and rules with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      LATS Service Layer                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (branch picker, POS)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SyncReport / ChildVariant (ts-rs)      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   lats-sync (orchestrator, caches)   lats-integrations (vendors)│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lats-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   error   │  │ validation│                  │   │
//! │  │   │ SyncReport│  │ CoreError │  │  phones   │                  │   │
//! │  │   │ChildVarian│  │ Validation│  │  branch   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ChildVariant, SyncReport, SendOutcome, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and phone normalisation
//!
//! ## Example Usage
//!
//! ```rust
//! use lats_core::{SyncDomain, SyncReportBuilder};
//!
//! let mut report = SyncReportBuilder::new();
//! report.record_success(SyncDomain::Caches);
//! report.record_failure(SyncDomain::Inventory, "timeout");
//!
//! let report = report.finish(42);
//! assert!(!report.success);
//! assert_eq!(report.refreshed_stores, vec!["caches".to_string()]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How long preloaded child variants stay fresh (5 minutes).
pub const DEFAULT_CHILD_VARIANT_TTL_SECS: u64 = 300;

/// `variant_type` value of serialised (IMEI) child variants.
///
/// Only these children are preloaded; parent and default variants are
/// loaded with the product itself.
pub const CHILD_VARIANT_TYPE: &str = "imei_child";

/// Phone prefix reserved for gateway testing.
///
/// Numbers starting with this prefix never reach the SMS provider.
pub const TEST_PHONE_PREFIX: &str = "255700";
