//! # lats-db: Database Layer for the LATS POS Service Layer
//!
//! SQLite storage accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LATS Data Flow                                   │
//! │                                                                         │
//! │  lats-sync (stores, child variant cache)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lats-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐  ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │  │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ ProductRepo     │  │  (embedded)  │  │   │
//! │  │   │               │◄───│ VariantRepo     │  │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │    │ BranchRecordRepo│  │              │  │   │
//! │  │   │               │    │ IntegrationRepo │  │              │  │   │
//! │  │   └───────────────┘    └─────────────────┘  └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lats_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("lats.db")).await?;
//! let children = db.variants().find_active_children(&parent_ids).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::branch_record::{BranchRecordRepository, BranchTable};
pub use repository::integration::IntegrationRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::variant::{NewVariant, VariantRepository, PARENT_VARIANT_TYPE};
