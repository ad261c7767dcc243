//! # lats-sync: Branch Sync for the LATS POS Service Layer
//!
//! Keeps the in-memory state of the service layer consistent with the
//! selected branch.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Branch Switch Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   BranchSyncOrchestrator                         │  │
//! │  │                                                                  │  │
//! │  │  Built once by the composition root                              │  │
//! │  │  Runs the fixed step order, aggregates failures                  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ CacheRegistry  │  │ Stores         │  │ ChildVariantCache      │    │
//! │  │                │  │                │  │                        │    │
//! │  │ clear() every  │  │ Inventory,     │  │ Bulk IMEI preload      │    │
//! │  │ holder at once │  │ POS, orders,   │  │ 5 minute TTL           │    │
//! │  │ best effort    │  │ customers, ... │  │ one load in flight     │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  NOTIFICATION (to the UI): one per branch switch                       │
//! │  • "Switched to <branch>"                                              │
//! │  • "Switched to <branch> with <n> error(s)"                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`orchestrator`] - `BranchSyncOrchestrator` and its builder
//! - [`invalidation`] - `CacheHolder` trait and the fan-out registry
//! - [`variant_cache`] - Keyed child variant preload cache
//! - [`stores`] - Branch-scoped stores refreshed on a switch
//! - [`notify`] - User-facing notifications
//! - [`config`] - Service configuration (TOML + environment)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lats_sync::{BranchSyncOrchestrator, CacheRegistry, ChildVariantCache};
//!
//! let cache = Arc::new(ChildVariantCache::new(Arc::new(db.variants())));
//! let orchestrator = BranchSyncOrchestrator::builder()
//!     .with_caches(CacheRegistry::new().with(cache.clone()))
//!     .with_store(SyncDomain::Auxiliary, Arc::new(VariantPreloadTrigger::new(db.variants(), cache)))
//!     .build()?;
//!
//! let report = orchestrator.sync_branch("arusha", "Arusha").await?;
//! println!("{}", serde_json::to_string(&report)?);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod invalidation;
pub mod notify;
pub mod orchestrator;
pub mod stores;
pub mod variant_cache;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::LatsConfig;
pub use error::{SyncError, SyncResult};
pub use invalidation::{CacheHolder, CacheRegistry, InvalidationSummary};
pub use notify::{LogNotifier, NoOpNotifier, SyncNotification, SyncNotifier};
pub use orchestrator::{BranchSyncOrchestrator, BranchSyncOrchestratorBuilder};
pub use stores::{BranchRecordStore, InventoryStore, RefreshableStore, VariantPreloadTrigger};
pub use variant_cache::{ChildVariantCache, ChildVariantSource, PreloadOutcome};
