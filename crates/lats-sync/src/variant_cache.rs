//! # Child Variant Cache
//!
//! Serialised (IMEI) child variants, preloaded in bulk and served from
//! memory so the POS grid never queries per product.
//!
//! ## Preload Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  preload([p1, p2, p2, p3])                                             │
//! │       │                                                                 │
//! │       ├── no keys?            → return (no fetch)                      │
//! │       ├── preload running?    → return (no wait, no fetch)             │
//! │       ├── fresh (< TTL)?      → return                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  source.fetch_children([p1, p2, p3])        ONE bulk call              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  group by parent_id, newest first                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  swap whole map in, stamp refreshed_at                                 │
//! │                                                                         │
//! │  On fetch error the previous contents stay as they were.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reads
//! `get`, `has`, `count` and `counts` never fetch. A parent with zero
//! sellable children reads as absent (`None`), never as an empty list.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::SyncResult;
use crate::invalidation::CacheHolder;
use lats_core::{ChildVariant, DEFAULT_CHILD_VARIANT_TTL_SECS};
use lats_db::VariantRepository;

// =============================================================================
// Source
// =============================================================================

/// Bulk source of child variants.
///
/// Implementations return only active, in-stock (`quantity > 0`)
/// `imei_child` variants whose parent is in `parent_ids`, in one call.
#[async_trait]
pub trait ChildVariantSource: Send + Sync {
    async fn fetch_children(&self, parent_ids: &[String]) -> SyncResult<Vec<ChildVariant>>;
}

#[async_trait]
impl ChildVariantSource for VariantRepository {
    async fn fetch_children(&self, parent_ids: &[String]) -> SyncResult<Vec<ChildVariant>> {
        Ok(self.find_active_children(parent_ids).await?)
    }
}

// =============================================================================
// Cache
// =============================================================================

/// What a call to [`ChildVariantCache::preload`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// No parent ids were given.
    NoKeys,
    /// Another preload was running; this call returned without waiting.
    AlreadyLoading,
    /// The cache was refreshed within the TTL.
    Fresh,
    /// Children were fetched and swapped in.
    Loaded { parents: usize, children: usize },
    /// The cache was cleared while fetching; the result was dropped.
    Discarded,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Vec<ChildVariant>>,
    refreshed_at: Option<Instant>,
}

/// Resets the in-flight flag however the preload ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-memory cache of child variants keyed by parent variant id.
pub struct ChildVariantCache {
    source: Arc<dyn ChildVariantSource>,
    ttl: Duration,
    state: RwLock<CacheState>,
    loading: AtomicBool,
    /// Bumped by `clear()`; a fetch started before a clear is discarded.
    generation: AtomicU64,
}

impl ChildVariantCache {
    /// Name reported to the cache registry.
    pub const NAME: &'static str = "child_variants";

    /// Creates a cache with the default 5 minute TTL.
    pub fn new(source: Arc<dyn ChildVariantSource>) -> Self {
        Self::with_ttl(source, Duration::from_secs(DEFAULT_CHILD_VARIANT_TTL_SECS))
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(source: Arc<dyn ChildVariantSource>, ttl: Duration) -> Self {
        ChildVariantCache {
            source,
            ttl,
            state: RwLock::new(CacheState::default()),
            loading: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Loads the children of `parent_ids` in one bulk fetch.
    ///
    /// Duplicate ids are fetched once. A fetch error is returned and leaves
    /// the cache untouched.
    pub async fn preload(&self, parent_ids: &[String]) -> SyncResult<PreloadOutcome> {
        if parent_ids.is_empty() {
            return Ok(PreloadOutcome::NoKeys);
        }

        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Child variant preload already running");
            return Ok(PreloadOutcome::AlreadyLoading);
        }
        let _guard = LoadingGuard(&self.loading);

        if self.is_fresh() {
            debug!("Child variant cache is fresh, skipping preload");
            return Ok(PreloadOutcome::Fresh);
        }

        let mut seen = HashSet::new();
        let keys: Vec<String> = parent_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let generation = self.generation.load(Ordering::Acquire);
        let children = self.source.fetch_children(&keys).await?;
        let fetched = children.len();
        let entries = group_by_parent(children);
        let parents = entries.len();

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if self.generation.load(Ordering::Acquire) != generation {
                debug!("Cache cleared during preload, discarding fetched children");
                return Ok(PreloadOutcome::Discarded);
            }
            state.entries = entries;
            state.refreshed_at = Some(Instant::now());
        }

        info!(
            requested = keys.len(),
            parents,
            children = fetched,
            "Preloaded child variants"
        );

        Ok(PreloadOutcome::Loaded {
            parents,
            children: fetched,
        })
    }

    /// Cached children of a parent, newest first. `None` when the parent is
    /// unknown or has no sellable children.
    pub fn get(&self, parent_id: &str) -> Option<Vec<ChildVariant>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entries
            .get(parent_id)
            .filter(|children| !children.is_empty())
            .cloned()
    }

    pub fn has(&self, parent_id: &str) -> bool {
        self.count(parent_id) > 0
    }

    /// Number of cached children of a parent (0 if unknown).
    pub fn count(&self, parent_id: &str) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.get(parent_id).map_or(0, Vec::len)
    }

    /// Child counts for many parents; unknown parents map to 0.
    pub fn counts(&self, parent_ids: &[String]) -> HashMap<String, usize> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        parent_ids
            .iter()
            .map(|id| (id.clone(), state.entries.get(id).map_or(0, Vec::len)))
            .collect()
    }

    /// Empties the cache and forgets when it was last refreshed.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.refreshed_at = None;
        debug!("Child variant cache cleared");
    }

    /// True if the last refresh happened less than one TTL ago.
    pub fn is_fresh(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .refreshed_at
            .is_some_and(|at| at.elapsed() < self.ttl)
    }

    /// True while a preload is fetching.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Number of parents with cached children.
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl CacheHolder for ChildVariantCache {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn clear(&self) -> SyncResult<()> {
        ChildVariantCache::clear(self);
        Ok(())
    }
}

impl std::fmt::Debug for ChildVariantCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildVariantCache")
            .field("ttl", &self.ttl)
            .field("parents", &self.len())
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Groups children by parent, newest first within each parent.
fn group_by_parent(children: Vec<ChildVariant>) -> HashMap<String, Vec<ChildVariant>> {
    let mut grouped: HashMap<String, Vec<ChildVariant>> = HashMap::new();
    for child in children.into_iter().filter(|c| c.quantity > 0) {
        grouped.entry(child.parent_id.clone()).or_default().push(child);
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use chrono::{TimeZone, Utc};
    use serde_json::Map;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn child(id: &str, parent: &str, minute: u32) -> ChildVariant {
        ChildVariant {
            id: id.to_string(),
            parent_id: parent.to_string(),
            name: format!("Unit {}", id),
            sku: None,
            quantity: 1,
            price_cents: 120_000,
            attributes: Map::new(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap(),
        }
    }

    #[derive(Default)]
    struct FakeSource {
        children: Vec<ChildVariant>,
        calls: AtomicUsize,
        requested: Mutex<Vec<Vec<String>>>,
        fail: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn with(children: Vec<ChildVariant>) -> Arc<Self> {
            Arc::new(FakeSource {
                children,
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChildVariantSource for FakeSource {
        async fn fetch_children(&self, parent_ids: &[String]) -> SyncResult<Vec<ChildVariant>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(parent_ids.to_vec());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(SyncError::DatabaseError("database is locked".into()));
            }
            Ok(self
                .children
                .iter()
                .filter(|c| parent_ids.contains(&c.parent_id))
                .cloned()
                .collect())
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_preload_groups_newest_first() {
        let source = FakeSource::with(vec![
            child("a1", "p1", 1),
            child("a2", "p1", 5),
            child("b1", "p2", 3),
        ]);
        let cache = ChildVariantCache::new(source.clone());

        let outcome = cache.preload(&ids(&["p1", "p2", "p3"])).await.unwrap();
        assert_eq!(
            outcome,
            PreloadOutcome::Loaded {
                parents: 2,
                children: 3
            }
        );

        let p1: Vec<String> = cache.get("p1").unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(p1, vec!["a2", "a1"]);
        assert_eq!(cache.count("p2"), 1);
        assert!(cache.get("p3").is_none());
        assert!(!cache.has("p3"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_keys_fetched_once() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::new(source.clone());

        cache.preload(&ids(&["p1", "p2", "p1", "p2"])).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(source.requested.lock().unwrap()[0], ids(&["p1", "p2"]));
    }

    #[tokio::test]
    async fn test_empty_keys_do_nothing() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::new(source.clone());
        cache.preload(&ids(&["p1"])).await.unwrap();
        cache.clear();
        cache.preload(&ids(&["p1"])).await.unwrap();

        let outcome = cache.preload(&[]).await.unwrap();

        assert_eq!(outcome, PreloadOutcome::NoKeys);
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.count("p1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_controls_refetch() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::new(source.clone());

        cache.preload(&ids(&["p1"])).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        let outcome = cache.preload(&ids(&["p1"])).await.unwrap();
        assert_eq!(outcome, PreloadOutcome::Fresh);
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_secs(241)).await;
        assert!(!cache.is_fresh());
        cache.preload(&ids(&["p1"])).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::with_ttl(source.clone(), Duration::from_secs(10));

        cache.preload(&ids(&["p1"])).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.preload(&ids(&["p1"])).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_resets_freshness() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::new(source.clone());

        cache.preload(&ids(&["p1"])).await.unwrap();
        assert!(cache.is_fresh());

        CacheHolder::clear(&cache).await.unwrap();
        assert!(!cache.is_fresh());
        assert!(cache.is_empty());

        cache.preload(&ids(&["p1"])).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_cache_untouched() {
        let source = FakeSource::with(vec![child("a1", "p1", 1)]);
        let cache = ChildVariantCache::with_ttl(source.clone(), Duration::from_secs(300));

        cache.preload(&ids(&["p1"])).await.unwrap();
        cache.clear();
        cache.state.write().unwrap().entries.insert("p1".into(), vec![child("old", "p1", 0)]);

        source.fail.store(true, Ordering::SeqCst);
        let err = cache.preload(&ids(&["p1"])).await.unwrap_err();
        assert!(matches!(err, SyncError::DatabaseError(_)));

        assert_eq!(cache.get("p1").unwrap()[0].id, "old");
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_concurrent_preload_does_not_refetch() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeSource {
            children: vec![child("a1", "p1", 1)],
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cache = Arc::new(ChildVariantCache::new(source.clone()));

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.preload(&ids(&["p1"])).await }
        });

        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(cache.is_loading());

        let second = cache.preload(&ids(&["p1"])).await.unwrap();
        assert_eq!(second, PreloadOutcome::AlreadyLoading);
        assert!(cache.get("p1").is_none());

        gate.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(cache.count("p1"), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_clear_during_preload_discards_result() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeSource {
            children: vec![child("a1", "p1", 1)],
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cache = Arc::new(ChildVariantCache::new(source.clone()));

        let preload = tokio::spawn({
            let cache = cache.clone();
            async move { cache.preload(&ids(&["p1"])).await }
        });
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }

        cache.clear();
        gate.notify_one();
        let outcome = preload.await.unwrap().unwrap();

        assert_eq!(outcome, PreloadOutcome::Discarded);
        assert!(cache.get("p1").is_none());
        assert!(!cache.is_fresh());
    }

    #[tokio::test]
    async fn test_counts_and_zero_stock_filtering() {
        let mut sold = child("s1", "p2", 2);
        sold.quantity = 0;
        let source = FakeSource::with(vec![child("a1", "p1", 1), sold]);
        let cache = ChildVariantCache::new(source);

        cache.preload(&ids(&["p1", "p2"])).await.unwrap();

        let counts = cache.counts(&ids(&["p1", "p2", "p9"]));
        assert_eq!(counts["p1"], 1);
        assert_eq!(counts["p2"], 0);
        assert_eq!(counts["p9"], 0);
        assert!(cache.get("p2").is_none());
    }
}
