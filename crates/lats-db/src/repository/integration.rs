//! # Integration Repository
//!
//! Vendor integration rows written by Admin Settings → Integrations and
//! read by the messaging clients when they are built.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::{decode_object, encode_object};
use lats_core::{Integration, IntegrationKind};

#[derive(sqlx::FromRow)]
struct IntegrationRow {
    is_enabled: bool,
    credentials: String,
    config: String,
}

/// Repository for integration settings.
#[derive(Debug, Clone)]
pub struct IntegrationRepository {
    pool: SqlitePool,
}

impl IntegrationRepository {
    /// Creates a new IntegrationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IntegrationRepository { pool }
    }

    /// Gets the stored settings of an integration, if any.
    pub async fn get(&self, kind: IntegrationKind) -> DbResult<Option<Integration>> {
        let row = sqlx::query_as::<_, IntegrationRow>(
            "SELECT is_enabled, credentials, config FROM integrations WHERE name = ?1",
        )
        .bind(kind.key())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(Integration {
                kind,
                is_enabled: row.is_enabled,
                credentials: decode_object("credentials", &row.credentials)?,
                config: decode_object("config", &row.config)?,
            })
        })
        .transpose()
    }

    /// Inserts or replaces an integration's settings.
    pub async fn upsert(&self, integration: &Integration) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO integrations (name, is_enabled, credentials, config, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO UPDATE SET
                is_enabled = excluded.is_enabled,
                credentials = excluded.credentials,
                config = excluded.config,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(integration.kind.key())
        .bind(integration.is_enabled)
        .bind(encode_object("credentials", &integration.credentials)?)
        .bind(encode_object("config", &integration.config)?)
        .bind(Utc::now())
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

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_integration_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let found = db.integrations().get(IntegrationKind::SmsGateway).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.integrations();

        let mut whatsapp = Integration {
            kind: IntegrationKind::WhatsappGreenApi,
            is_enabled: false,
            credentials: object(json!({"instance_id": "7103", "api_token": "tok"})),
            config: Map::new(),
        };
        repo.upsert(&whatsapp).await.unwrap();

        whatsapp.is_enabled = true;
        repo.upsert(&whatsapp).await.unwrap();

        let loaded = repo
            .get(IntegrationKind::WhatsappGreenApi)
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.is_enabled);
        assert_eq!(loaded.credential("instance_id"), Some("7103"));
        assert!(repo.get(IntegrationKind::Email).await.unwrap().is_none());
    }
}
