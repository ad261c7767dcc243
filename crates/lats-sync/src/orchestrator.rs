//! # Branch Sync Orchestrator
//!
//! Runs every refresh a branch switch needs, in a fixed order, and reports
//! what worked and what did not.
//!
//! ## Step Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      sync_branch(branch_id, name)                       │
//! │                                                                         │
//! │  1. caches           CacheRegistry::invalidate_all()   (never fails)   │
//! │  2. inventory        ─┐                                                │
//! │  3. pos               │                                                │
//! │  4. purchase_orders   │  each step guarded on its own:                 │
//! │  5. customers         │  an error is recorded, the next step runs      │
//! │  6. admin_settings    │                                                │
//! │  7. auxiliary        ─┘                                                │
//! │                                                                         │
//! │  → SyncReport { success, errors, refreshedStores, duration }           │
//! │  → exactly one notification                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A domain with no registered store is skipped: it is neither refreshed
//! nor an error. Nothing is retried; partial failure is a normal result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::{SyncError, SyncResult};
use crate::invalidation::CacheRegistry;
use crate::notify::{NoOpNotifier, SyncNotification, SyncNotifier};
use crate::stores::RefreshableStore;
use lats_core::validation::validate_branch_id;
use lats_core::{SyncDomain, SyncReport, SyncReportBuilder};

// =============================================================================
// Orchestrator
// =============================================================================

/// Coordinates cache invalidation and store refreshes on a branch switch.
pub struct BranchSyncOrchestrator {
    caches: CacheRegistry,

    /// Refresh steps in execution order, resolved when built.
    steps: Vec<(SyncDomain, Option<Arc<dyn RefreshableStore>>)>,

    notifier: Arc<dyn SyncNotifier>,
}

impl BranchSyncOrchestrator {
    /// Starts building an orchestrator.
    pub fn builder() -> BranchSyncOrchestratorBuilder {
        BranchSyncOrchestratorBuilder::new()
    }

    /// Switches the service layer to another branch.
    ///
    /// Only an invalid `branch_id` is an `Err`; everything that goes wrong
    /// during the refresh is reported inside the returned [`SyncReport`].
    pub async fn sync_branch(&self, branch_id: &str, branch_name: &str) -> SyncResult<SyncReport> {
        let branch_id = validate_branch_id(branch_id)?;

        let started = Instant::now();
        info!(branch_id = %branch_id, branch_name = %branch_name, "Starting branch sync");

        let mut report = SyncReportBuilder::new();

        let summary = self.caches.invalidate_all().await;
        debug!(
            cleared = summary.cleared.len(),
            failed = summary.failed.len(),
            "Caches invalidated"
        );
        report.record_success(SyncDomain::Caches);

        for (domain, store) in &self.steps {
            let Some(store) = store else {
                debug!(domain = %domain, "No store registered, skipping");
                continue;
            };

            match store.refresh(branch_id).await {
                Ok(()) => {
                    debug!(domain = %domain, store = store.name(), "Step completed");
                    report.record_success(*domain);
                }
                Err(e) => {
                    error!(domain = %domain, store = store.name(), error = %e, "Step failed");
                    report.record_failure(*domain, &e);
                }
            }
        }

        let report = report.finish(started.elapsed().as_millis() as u64);

        info!(
            branch_id = %branch_id,
            success = report.success,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "Branch sync finished"
        );

        self.notifier
            .notify(&SyncNotification::for_report(branch_name, &report));

        Ok(report)
    }

    /// Domains that will run a store, in order (excluding cache invalidation).
    pub fn active_domains(&self) -> Vec<SyncDomain> {
        self.steps
            .iter()
            .filter(|(_, store)| store.is_some())
            .map(|(domain, _)| *domain)
            .collect()
    }

    pub fn caches(&self) -> &CacheRegistry {
        &self.caches
    }
}

impl std::fmt::Debug for BranchSyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchSyncOrchestrator")
            .field("caches", &self.caches)
            .field("active_domains", &self.active_domains())
            .finish()
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for [`BranchSyncOrchestrator`].
#[derive(Default)]
pub struct BranchSyncOrchestratorBuilder {
    caches: CacheRegistry,
    stores: HashMap<SyncDomain, Arc<dyn RefreshableStore>>,
    notifier: Option<Arc<dyn SyncNotifier>>,
}

impl BranchSyncOrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache registry cleared in step 1.
    pub fn with_caches(mut self, caches: CacheRegistry) -> Self {
        self.caches = caches;
        self
    }

    /// Registers the store refreshed for `domain`. A later call for the same
    /// domain replaces the earlier store.
    pub fn with_store(mut self, domain: SyncDomain, store: Arc<dyn RefreshableStore>) -> Self {
        self.stores.insert(domain, store);
        self
    }

    /// Sets the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn SyncNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the orchestrator.
    pub fn build(mut self) -> SyncResult<BranchSyncOrchestrator> {
        if self.stores.contains_key(&SyncDomain::Caches) {
            return Err(SyncError::InvalidConfig(
                "caches are cleared through the cache registry, not a store".into(),
            ));
        }

        let steps = SyncDomain::ALL
            .into_iter()
            .filter(|domain| *domain != SyncDomain::Caches)
            .map(|domain| (domain, self.stores.remove(&domain)))
            .collect();

        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoOpNotifier));

        Ok(BranchSyncOrchestrator {
            caches: self.caches,
            steps,
            notifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invalidation::CacheHolder;
    use crate::notify::NotificationLevel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Shared log of which stores ran, in order.
    type CallLog = Arc<Mutex<Vec<String>>>;

    struct FakeStore {
        name: &'static str,
        fail: bool,
        log: CallLog,
    }

    #[async_trait]
    impl RefreshableStore for FakeStore {
        fn name(&self) -> &str {
            self.name
        }

        async fn refresh(&self, branch_id: &str) -> SyncResult<()> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, branch_id));
            if self.fail {
                Err(SyncError::store(self.name, "connection reset"))
            } else {
                Ok(())
            }
        }
    }

    struct FailingCache {
        clears: AtomicUsize,
    }

    #[async_trait]
    impl CacheHolder for FailingCache {
        fn name(&self) -> &str {
            "broken"
        }

        async fn clear(&self) -> SyncResult<()> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            Err(SyncError::cache("broken", "disk full"))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<SyncNotification>>,
    }

    impl SyncNotifier for RecordingNotifier {
        fn notify(&self, notification: &SyncNotification) {
            self.seen.lock().unwrap().push(notification.clone());
        }
    }

    const REFRESH_DOMAINS: [(SyncDomain, &str); 6] = [
        (SyncDomain::Inventory, "inventory"),
        (SyncDomain::PointOfSale, "pos"),
        (SyncDomain::PurchaseOrders, "purchase_orders"),
        (SyncDomain::Customers, "customers"),
        (SyncDomain::AdminSettings, "admin_settings"),
        (SyncDomain::Auxiliary, "auxiliary"),
    ];

    fn build(
        failing: Option<SyncDomain>,
        notifier: Arc<RecordingNotifier>,
    ) -> (BranchSyncOrchestrator, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mut builder = BranchSyncOrchestrator::builder().with_notifier(notifier);
        for (domain, name) in REFRESH_DOMAINS {
            builder = builder.with_store(
                domain,
                Arc::new(FakeStore {
                    name,
                    fail: failing == Some(domain),
                    log: log.clone(),
                }),
            );
        }
        (builder.build().unwrap(), log)
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (orchestrator, log) = build(None, notifier.clone());

        let report = orchestrator.sync_branch("dar", "Dar es Salaam").await.unwrap();

        assert!(report.success);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.refreshed_stores,
            vec![
                "caches",
                "inventory",
                "pos",
                "purchase_orders",
                "customers",
                "admin_settings",
                "auxiliary"
            ]
        );
        assert_eq!(log.lock().unwrap().len(), 6);
        assert_eq!(log.lock().unwrap()[0], "inventory:dar");

        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Success);
        assert_eq!(seen[0].message, "Switched to Dar es Salaam");
    }

    #[tokio::test]
    async fn test_each_single_failure_is_isolated() {
        for (failing, name) in REFRESH_DOMAINS {
            let notifier = Arc::new(RecordingNotifier::default());
            let (orchestrator, log) = build(Some(failing), notifier.clone());

            let report = orchestrator.sync_branch("arusha", "Arusha").await.unwrap();

            assert!(!report.success, "{} should fail", name);
            assert_eq!(report.errors.len(), 1);
            assert!(
                report.errors[0].starts_with(failing.failure_label()),
                "unexpected error: {}",
                report.errors[0]
            );
            assert!(report.errors[0].contains("connection reset"));
            assert_eq!(report.refreshed_stores.len(), 6);
            assert!(!report.refreshed_stores.contains(&name.to_string()));
            assert_eq!(log.lock().unwrap().len(), 6, "later steps still run");

            let seen = notifier.seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].message, "Switched to Arusha with 1 error(s)");
        }
    }

    #[tokio::test]
    async fn test_inventory_failure_message() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (orchestrator, _) = build(Some(SyncDomain::Inventory), notifier);

        let report = orchestrator.sync_branch("dar", "Dar").await.unwrap();

        assert_eq!(
            report.errors,
            vec!["Failed to refresh inventory: Store 'inventory' failed: connection reset"]
        );
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_sync() {
        let cache = Arc::new(FailingCache {
            clears: AtomicUsize::new(0),
        });
        let orchestrator = BranchSyncOrchestrator::builder()
            .with_caches(CacheRegistry::new().with(cache.clone()))
            .build()
            .unwrap();

        let report = orchestrator.sync_branch("dar", "Dar").await.unwrap();

        assert!(report.success);
        assert_eq!(report.refreshed_stores, vec!["caches"]);
        assert_eq!(cache.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unregistered_domains_are_skipped() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = BranchSyncOrchestrator::builder()
            .with_store(
                SyncDomain::Customers,
                Arc::new(FakeStore {
                    name: "customers",
                    fail: false,
                    log: log.clone(),
                }),
            )
            .build()
            .unwrap();

        assert_eq!(orchestrator.active_domains(), vec![SyncDomain::Customers]);

        let report = orchestrator.sync_branch("dar", "Dar").await.unwrap();
        assert!(report.success);
        assert_eq!(report.refreshed_stores, vec!["caches", "customers"]);
    }

    #[tokio::test]
    async fn test_empty_branch_id_is_rejected() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (orchestrator, log) = build(None, notifier.clone());

        let err = orchestrator.sync_branch("  ", "Nowhere").await.unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
        assert!(log.lock().unwrap().is_empty());
        assert!(notifier.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_caches_domain_cannot_take_a_store() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let result = BranchSyncOrchestrator::builder()
            .with_store(
                SyncDomain::Caches,
                Arc::new(FakeStore {
                    name: "caches",
                    fail: false,
                    log,
                }),
            )
            .build();

        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }
}
