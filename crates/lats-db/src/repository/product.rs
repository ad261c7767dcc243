//! # Product Repository
//!
//! Branch inventory listing. The inventory store reloads its snapshot
//! through [`ProductRepository::list_active`] on every branch switch.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use lats_core::Product;

/// Fields needed to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub branch_id: String,
    pub name: String,
    pub sku: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    branch_id: String,
    name: String,
    sku: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            branch_id: row.branch_id,
            name: row.name,
            sku: row.sku,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products of a branch, sorted by name.
    pub async fn list_active(&self, branch_id: &str) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, branch_id, name, sku, is_active, created_at, updated_at
            FROM products
            WHERE branch_id = ?1 AND is_active = 1
            ORDER BY name
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(branch_id = %branch_id, count = rows.len(), "Listed active products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Inserts a product and returns it.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            branch_id: new.branch_id.clone(),
            name: new.name.clone(),
            sku: new.sku.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, branch_id, name, sku, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.branch_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Soft-deletes a product.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
