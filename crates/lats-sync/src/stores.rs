//! # Branch Stores
//!
//! In-process state containers the orchestrator refreshes on a branch
//! switch. Each store keeps a snapshot of one branch's rows and can be
//! cleared by the cache fan-out.
//!
//! ## Store Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SyncDomain        Store                       Backing data            │
//! │  ──────────        ─────                       ────────────            │
//! │  Inventory         InventoryStore              products                │
//! │  PointOfSale       BranchRecordStore           pos_settings            │
//! │  PurchaseOrders    BranchRecordStore           purchase_orders         │
//! │  Customers         BranchRecordStore           customers               │
//! │  AdminSettings     BranchRecordStore           admin_settings          │
//! │  Auxiliary         VariantPreloadTrigger       product_variants        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::invalidation::CacheHolder;
use crate::variant_cache::ChildVariantCache;
use lats_core::{BranchRecord, Product};
use lats_db::{BranchRecordRepository, BranchTable, ProductRepository, VariantRepository};

// =============================================================================
// Traits
// =============================================================================

/// A store that reloads its data for a branch.
#[async_trait]
pub trait RefreshableStore: Send + Sync {
    fn name(&self) -> &str;

    async fn refresh(&self, branch_id: &str) -> SyncResult<()>;
}

// =============================================================================
// Snapshot
// =============================================================================

/// Rows loaded for one branch.
#[derive(Debug, Clone)]
pub struct BranchSnapshot<T> {
    pub branch_id: String,
    pub rows: Vec<T>,
    pub loaded_at: DateTime<Utc>,
}

// =============================================================================
// Inventory
// =============================================================================

/// Active products of the current branch.
#[derive(Debug)]
pub struct InventoryStore {
    repo: ProductRepository,
    snapshot: RwLock<Option<BranchSnapshot<Product>>>,
}

impl InventoryStore {
    pub fn new(repo: ProductRepository) -> Self {
        InventoryStore {
            repo,
            snapshot: RwLock::new(None),
        }
    }

    /// The loaded snapshot, if any.
    pub async fn snapshot(&self) -> Option<BranchSnapshot<Product>> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl RefreshableStore for InventoryStore {
    fn name(&self) -> &str {
        "inventory"
    }

    async fn refresh(&self, branch_id: &str) -> SyncResult<()> {
        let rows = self
            .repo
            .list_active(branch_id)
            .await
            .map_err(|e| SyncError::store("inventory", e.to_string()))?;

        debug!(branch_id = %branch_id, products = rows.len(), "Inventory refreshed");
        *self.snapshot.write().await = Some(BranchSnapshot {
            branch_id: branch_id.to_string(),
            rows,
            loaded_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl CacheHolder for InventoryStore {
    fn name(&self) -> &str {
        "inventory"
    }

    async fn clear(&self) -> SyncResult<()> {
        *self.snapshot.write().await = None;
        Ok(())
    }
}

// =============================================================================
// Branch Records
// =============================================================================

/// Branch-scoped documents of one table (settings, orders, customers).
#[derive(Debug)]
pub struct BranchRecordStore {
    table: BranchTable,
    repo: BranchRecordRepository,
    snapshot: RwLock<Option<BranchSnapshot<BranchRecord>>>,
}

impl BranchRecordStore {
    pub fn new(table: BranchTable, repo: BranchRecordRepository) -> Self {
        BranchRecordStore {
            table,
            repo,
            snapshot: RwLock::new(None),
        }
    }

    pub fn table(&self) -> BranchTable {
        self.table
    }

    pub async fn snapshot(&self) -> Option<BranchSnapshot<BranchRecord>> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl RefreshableStore for BranchRecordStore {
    fn name(&self) -> &str {
        self.table.table_name()
    }

    async fn refresh(&self, branch_id: &str) -> SyncResult<()> {
        let rows = self
            .repo
            .load(self.table, branch_id)
            .await
            .map_err(|e| SyncError::store(self.table.table_name(), e.to_string()))?;

        debug!(table = %self.table, branch_id = %branch_id, rows = rows.len(), "Store refreshed");
        *self.snapshot.write().await = Some(BranchSnapshot {
            branch_id: branch_id.to_string(),
            rows,
            loaded_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl CacheHolder for BranchRecordStore {
    fn name(&self) -> &str {
        self.table.table_name()
    }

    async fn clear(&self) -> SyncResult<()> {
        *self.snapshot.write().await = None;
        Ok(())
    }
}

// =============================================================================
// Auxiliary: child variant preload
// =============================================================================

/// Preloads the child variants of every parent variant in the new branch.
#[derive(Debug)]
pub struct VariantPreloadTrigger {
    variants: VariantRepository,
    cache: Arc<ChildVariantCache>,
}

impl VariantPreloadTrigger {
    pub fn new(variants: VariantRepository, cache: Arc<ChildVariantCache>) -> Self {
        VariantPreloadTrigger { variants, cache }
    }
}

#[async_trait]
impl RefreshableStore for VariantPreloadTrigger {
    fn name(&self) -> &str {
        "child_variant_preload"
    }

    async fn refresh(&self, branch_id: &str) -> SyncResult<()> {
        let parent_ids = self.variants.parent_ids_for_branch(branch_id).await?;
        let outcome = self.cache.preload(&parent_ids).await?;
        debug!(branch_id = %branch_id, ?outcome, "Child variant preload triggered");
        Ok(())
    }
}
