//! # Service Wiring
//!
//! Every service is built here and handed to whoever needs it. Nothing in
//! the library crates reaches for a global.
//!
//! ```text
//! Database ─┬─► InventoryStore ──────────┐
//!           ├─► BranchRecordStore × 4 ───┤ registered as CacheHolders
//!           ├─► ChildVariantCache ───────┤ and as orchestrator steps
//!           │                            ▼
//!           │                   BranchSyncOrchestrator
//!           │
//!           └─► integrations row ──► GreenApiClient / SmsClient ──► Messenger
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use lats_core::{IntegrationKind, SyncDomain};
use lats_db::{BranchTable, Database, DbConfig};
use lats_integrations::{EmailStub, GreenApiClient, IntegrationResult, Messenger, SmsClient};
use lats_sync::{
    BranchRecordStore, BranchSyncOrchestrator, CacheRegistry, ChildVariantCache, InventoryStore,
    LatsConfig, LogNotifier, VariantPreloadTrigger,
};

pub struct Services {
    pub config: LatsConfig,
    pub db: Database,
    pub variant_cache: Arc<ChildVariantCache>,
    pub orchestrator: BranchSyncOrchestrator,
}

impl Services {
    pub async fn start(config: LatsConfig) -> Result<Self> {
        let db = Database::new(DbConfig::new(&config.database.path))
            .await
            .with_context(|| format!("opening database {}", config.database.path.display()))?;

        let variant_cache = Arc::new(ChildVariantCache::with_ttl(
            Arc::new(db.variants()),
            config.child_variant_ttl(),
        ));
        let orchestrator = build_orchestrator(&db, variant_cache.clone())?;

        info!(
            domains = ?orchestrator.active_domains(),
            caches = orchestrator.caches().len(),
            "Services ready"
        );

        Ok(Services {
            config,
            db,
            variant_cache,
            orchestrator,
        })
    }

    pub async fn green_api(&self) -> Result<IntegrationResult<GreenApiClient>> {
        let row = self
            .db
            .integrations()
            .get(IntegrationKind::WhatsappGreenApi)
            .await?;
        Ok(GreenApiClient::from_integration(
            row.as_ref(),
            &self.config.integrations.green_api_url,
            self.config.request_timeout(),
        ))
    }

    pub async fn sms(&self) -> Result<IntegrationResult<SmsClient>> {
        let row = self.db.integrations().get(IntegrationKind::SmsGateway).await?;
        Ok(SmsClient::from_integration(
            row.as_ref(),
            &self.config.integrations.sms_proxy_url,
            self.config.request_timeout(),
        ))
    }

    /// Builds a messenger with every integration kind installed.
    pub async fn messenger(&self) -> Result<Messenger> {
        Ok(Messenger::new()
            .with(IntegrationKind::WhatsappGreenApi, self.green_api().await?)
            .with(IntegrationKind::SmsGateway, self.sms().await?)
            .with(IntegrationKind::Email, Ok(EmailStub::new())))
    }

    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}

fn build_orchestrator(
    db: &Database,
    variant_cache: Arc<ChildVariantCache>,
) -> Result<BranchSyncOrchestrator> {
    let inventory = Arc::new(InventoryStore::new(db.products()));
    let pos = Arc::new(BranchRecordStore::new(BranchTable::PosSettings, db.branch_records()));
    let orders = Arc::new(BranchRecordStore::new(BranchTable::PurchaseOrders, db.branch_records()));
    let customers = Arc::new(BranchRecordStore::new(BranchTable::Customers, db.branch_records()));
    let admin = Arc::new(BranchRecordStore::new(BranchTable::AdminSettings, db.branch_records()));

    let caches = CacheRegistry::new()
        .with(inventory.clone())
        .with(pos.clone())
        .with(orders.clone())
        .with(customers.clone())
        .with(admin.clone())
        .with(variant_cache.clone());

    let orchestrator = BranchSyncOrchestrator::builder()
        .with_caches(caches)
        .with_store(SyncDomain::Inventory, inventory)
        .with_store(SyncDomain::PointOfSale, pos)
        .with_store(SyncDomain::PurchaseOrders, orders)
        .with_store(SyncDomain::Customers, customers)
        .with_store(SyncDomain::AdminSettings, admin)
        .with_store(
            SyncDomain::Auxiliary,
            Arc::new(VariantPreloadTrigger::new(db.variants(), variant_cache)),
        )
        .with_notifier(Arc::new(LogNotifier))
        .build()?;

    Ok(orchestrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wires_every_domain() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = Arc::new(ChildVariantCache::new(Arc::new(db.variants())));

        let orchestrator = build_orchestrator(&db, cache).unwrap();

        assert_eq!(orchestrator.active_domains(), SyncDomain::ALL[1..].to_vec());
        assert_eq!(orchestrator.caches().len(), 6);
    }
}
