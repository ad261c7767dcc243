//! # Variant Repository
//!
//! Parent/child variant lookups.
//!
//! ## Bulk Child Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  parent ids: [p1, p2, p3]                                              │
//! │       │                                                                 │
//! │       ▼  ONE query, not one per parent                                 │
//! │  SELECT ... FROM product_variants                                      │
//! │  WHERE variant_type = 'imei_child'                                     │
//! │    AND is_active = 1 AND quantity > 0                                  │
//! │    AND parent_variant_id IN (?, ?, ?)                                  │
//! │  ORDER BY created_at DESC                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  flat Vec<ChildVariant>, newest first (grouped later by the cache)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_object, encode_object};
use lats_core::{ChildVariant, CHILD_VARIANT_TYPE};

/// `variant_type` of variants that own serialised children.
pub const PARENT_VARIANT_TYPE: &str = "parent";

/// Fields needed to create a variant.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub product_id: String,
    pub parent_variant_id: Option<String>,
    pub name: String,
    pub variant_name: Option<String>,
    pub sku: Option<String>,
    pub variant_type: String,
    pub quantity: i64,
    pub selling_price_cents: i64,
    pub attributes: Map<String, Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl NewVariant {
    /// A parent variant for `product_id`.
    pub fn parent(product_id: impl Into<String>, name: impl Into<String>) -> Self {
        NewVariant {
            product_id: product_id.into(),
            parent_variant_id: None,
            name: name.into(),
            variant_name: None,
            sku: None,
            variant_type: PARENT_VARIANT_TYPE.to_string(),
            quantity: 0,
            selling_price_cents: 0,
            attributes: Map::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// One in-stock serialised unit under `parent_variant_id`.
    pub fn imei_child(
        product_id: impl Into<String>,
        parent_variant_id: impl Into<String>,
        imei: &str,
    ) -> Self {
        let mut attributes = Map::new();
        attributes.insert("imei".to_string(), Value::String(imei.to_string()));
        NewVariant {
            product_id: product_id.into(),
            parent_variant_id: Some(parent_variant_id.into()),
            name: format!("IMEI {}", imei),
            variant_name: None,
            sku: None,
            variant_type: CHILD_VARIANT_TYPE.to_string(),
            quantity: 1,
            selling_price_cents: 0,
            attributes,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChildVariantRow {
    id: String,
    parent_variant_id: String,
    name: String,
    variant_name: Option<String>,
    sku: Option<String>,
    quantity: i64,
    selling_price_cents: i64,
    attributes: String,
    created_at: DateTime<Utc>,
}

impl ChildVariantRow {
    /// Formats a row for display: the variant name wins over the base name.
    fn into_child(self) -> DbResult<ChildVariant> {
        let name = self
            .variant_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.name);

        Ok(ChildVariant {
            id: self.id,
            parent_id: self.parent_variant_id,
            name,
            sku: self.sku,
            quantity: self.quantity,
            price_cents: self.selling_price_cents,
            attributes: decode_object("attributes", &self.attributes)?,
            created_at: self.created_at,
        })
    }
}

/// Repository for product variant operations.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Fetches the sellable children of many parents in one query.
    ///
    /// Only active, in-stock `imei_child` variants are returned, newest
    /// first. Parents without such children simply do not appear.
    pub async fn find_active_children(&self, parent_ids: &[String]) -> DbResult<Vec<ChildVariant>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        // One bound JSON array keeps the query under SQLite's variable limit.
        let ids = serde_json::to_string(parent_ids)
            .map_err(|e| DbError::invalid_json("parent_variant_id", e))?;

        let rows = sqlx::query_as::<_, ChildVariantRow>(
            r#"
            SELECT id, parent_variant_id, name, variant_name, sku, quantity,
                   selling_price_cents, attributes, created_at
            FROM product_variants
            WHERE variant_type = ?
              AND is_active = 1
              AND quantity > 0
              AND parent_variant_id IN (SELECT value FROM json_each(?))
            ORDER BY created_at DESC
            "#,
        )
        .bind(CHILD_VARIANT_TYPE)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            parents = parent_ids.len(),
            children = rows.len(),
            "Fetched child variants"
        );

        rows.into_iter().map(ChildVariantRow::into_child).collect()
    }

    /// Ids of active parent variants belonging to a branch's active products.
    pub async fn parent_ids_for_branch(&self, branch_id: &str) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT v.id
            FROM product_variants v
            INNER JOIN products p ON p.id = v.product_id
            WHERE p.branch_id = ?1
              AND p.is_active = 1
              AND v.is_active = 1
              AND v.variant_type = ?2
            ORDER BY v.created_at
            "#,
        )
        .bind(branch_id)
        .bind(PARENT_VARIANT_TYPE)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Inserts a variant and returns its id.
    pub async fn insert(&self, new: &NewVariant) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let attributes = encode_object("attributes", &new.attributes)?;

        sqlx::query(
            r#"
            INSERT INTO product_variants (
                id, product_id, parent_variant_id, name, variant_name, sku,
                variant_type, quantity, selling_price_cents, attributes,
                is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&id)
        .bind(&new.product_id)
        .bind(&new.parent_variant_id)
        .bind(&new.name)
        .bind(&new.variant_name)
        .bind(&new.sku)
        .bind(&new.variant_type)
        .bind(new.quantity)
        .bind(new.selling_price_cents)
        .bind(attributes)
        .bind(new.is_active)
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Sets the on-hand quantity of a variant (a sale sets a unit to 0).
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> DbResult<()> {
        sqlx::query("UPDATE product_variants SET quantity = ?2 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
