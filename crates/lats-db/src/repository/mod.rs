//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller (store refresh, cache preload)                                 │
//! │       │                                                                 │
//! │       │  db.variants().find_active_children(&ids)                      │
//! │       ▼                                                                 │
//! │  VariantRepository                                                     │
//! │  ├── find_active_children(&self, parent_ids)                           │
//! │  ├── parent_ids_for_branch(&self, branch_id)                           │
//! │  └── insert(&self, variant)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Branch inventory listing
//! - [`variant::VariantRepository`] - Parent/child variant lookups
//! - [`branch_record::BranchRecordRepository`] - Branch-scoped JSON documents
//! - [`integration::IntegrationRepository`] - Vendor integration settings

pub mod branch_record;
pub mod integration;
pub mod product;
pub mod variant;

use serde_json::{Map, Value};

use crate::error::{DbError, DbResult};

/// Decodes a JSON object column. `NULL`-ish empty text decodes to `{}`.
pub(crate) fn decode_object(column: &str, raw: &str) -> DbResult<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(raw).map_err(|e| DbError::invalid_json(column, e))
}

/// Encodes a JSON object for storage in a TEXT column.
pub(crate) fn encode_object(column: &str, value: &Map<String, Value>) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::invalid_json(column, e))
}
