//! # Cache Invalidation Fan-out
//!
//! Clears every registered cache at once when the branch changes.
//!
//! ## Fan-out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invalidate_all()                                                       │
//! │       │                                                                 │
//! │       ├──► inventory.clear()        ─┐                                  │
//! │       ├──► customers.clear()         │  all started together            │
//! │       ├──► child_variants.clear()    │                                  │
//! │       └──► ...                      ─┘                                  │
//! │                                      │                                  │
//! │                                      ▼  join: wait for every one        │
//! │  InvalidationSummary { cleared, failed }                                │
//! │                                                                         │
//! │  A failing holder is logged and skipped. The fan-out itself never      │
//! │  fails, and no holder waits on another.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SyncResult;

/// Anything holding branch-scoped data in memory.
#[async_trait]
pub trait CacheHolder: Send + Sync {
    /// Name used in logs and in [`InvalidationSummary`].
    fn name(&self) -> &str;

    /// Drops all cached data.
    async fn clear(&self) -> SyncResult<()>;
}

/// Which holders cleared and which failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationSummary {
    pub cleared: Vec<String>,
    pub failed: Vec<String>,
}

impl InvalidationSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The set of cache holders, populated once at startup.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    holders: Vec<Arc<dyn CacheHolder>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a holder.
    pub fn register(&mut self, holder: Arc<dyn CacheHolder>) {
        debug!(cache = holder.name(), "Registered cache holder");
        self.holders.push(holder);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, holder: Arc<dyn CacheHolder>) -> Self {
        self.register(holder);
        self
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// Registered holder names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.holders.iter().map(|h| h.name().to_string()).collect()
    }

    /// Clears every holder concurrently and waits for all of them.
    pub async fn invalidate_all(&self) -> InvalidationSummary {
        let clears = self.holders.iter().map(|holder| async move {
            let result = holder.clear().await;
            (holder.name().to_string(), result)
        });

        let mut summary = InvalidationSummary::default();
        for (name, result) in join_all(clears).await {
            match result {
                Ok(()) => summary.cleared.push(name),
                Err(e) => {
                    warn!(cache = %name, error = %e, "Cache clear failed");
                    summary.failed.push(name);
                }
            }
        }

        debug!(
            cleared = summary.cleared.len(),
            failed = summary.failed.len(),
            "Cache invalidation finished"
        );
        summary
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("holders", &self.names())
            .finish()
    }
}
