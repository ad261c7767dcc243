//! # Branch Record Repository
//!
//! Branch-scoped JSON documents (POS settings, purchase orders, customers,
//! admin settings). All four tables share one shape, so a single repository
//! serves them, keyed by [`BranchTable`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{decode_object, encode_object};
use lats_core::BranchRecord;

/// Tables holding branch-scoped documents.
///
/// Table names are interpolated into SQL, so only these fixed names are
/// ever used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchTable {
    PosSettings,
    PurchaseOrders,
    Customers,
    AdminSettings,
}

impl BranchTable {
    pub const fn table_name(&self) -> &'static str {
        match self {
            BranchTable::PosSettings => "pos_settings",
            BranchTable::PurchaseOrders => "purchase_orders",
            BranchTable::Customers => "customers",
            BranchTable::AdminSettings => "admin_settings",
        }
    }
}

impl std::fmt::Display for BranchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(sqlx::FromRow)]
struct BranchRecordRow {
    id: String,
    branch_id: String,
    data: String,
    updated_at: DateTime<Utc>,
}

impl BranchRecordRow {
    fn into_record(self) -> DbResult<BranchRecord> {
        Ok(BranchRecord {
            data: decode_object("data", &self.data)?,
            id: self.id,
            branch_id: self.branch_id,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for branch-scoped documents.
#[derive(Debug, Clone)]
pub struct BranchRecordRepository {
    pool: SqlitePool,
}

impl BranchRecordRepository {
    /// Creates a new BranchRecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BranchRecordRepository { pool }
    }

    /// Loads every record of `table` belonging to `branch_id`, most recently
    /// updated first.
    pub async fn load(&self, table: BranchTable, branch_id: &str) -> DbResult<Vec<BranchRecord>> {
        let sql = format!(
            "SELECT id, branch_id, data, updated_at FROM {} WHERE branch_id = ?1 ORDER BY updated_at DESC",
            table.table_name()
        );

        let rows = sqlx::query_as::<_, BranchRecordRow>(&sql)
            .bind(branch_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(table = %table, branch_id = %branch_id, count = rows.len(), "Loaded branch records");

        rows.into_iter().map(BranchRecordRow::into_record).collect()
    }

    /// Inserts or replaces a record.
    pub async fn upsert(&self, table: BranchTable, record: &BranchRecord) -> DbResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, branch_id, data, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                branch_id = excluded.branch_id,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            table.table_name()
        );

        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.branch_id)
            .bind(encode_object("data", &record.data)?)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::{json, Map, Value};

    fn record(id: &str, branch: &str, data: Value) -> BranchRecord {
        let data: Map<String, Value> = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        BranchRecord {
            id: id.into(),
            branch_id: branch.into(),
            data,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_is_scoped_by_table_and_branch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.branch_records();

        repo.upsert(BranchTable::Customers, &record("c1", "dar", json!({"name": "Asha"})))
            .await
            .unwrap();
        repo.upsert(BranchTable::Customers, &record("c2", "arusha", json!({"name": "Juma"})))
            .await
            .unwrap();
        repo.upsert(BranchTable::PurchaseOrders, &record("po1", "dar", json!({"total": 10})))
            .await
            .unwrap();

        let customers = repo.load(BranchTable::Customers, "dar").await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].data["name"], "Asha");

        let orders = repo.load(BranchTable::PurchaseOrders, "dar").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert!(repo.load(BranchTable::AdminSettings, "dar").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_record() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.branch_records();

        repo.upsert(BranchTable::PosSettings, &record("s1", "dar", json!({"receipt": "short"})))
            .await
            .unwrap();
        repo.upsert(BranchTable::PosSettings, &record("s1", "dar", json!({"receipt": "long"})))
            .await
            .unwrap();

        let settings = repo.load(BranchTable::PosSettings, "dar").await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].data["receipt"], "long");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(BranchTable::PosSettings.to_string(), "pos_settings");
        assert_eq!(BranchTable::AdminSettings.table_name(), "admin_settings");
    }
}
