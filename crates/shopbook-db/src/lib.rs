//! # shopbook-db: Database Layer for Shopbook
//!
//! This crate provides database access for the Shopbook bookkeeping engine.
//! It uses SQLite for local storage with sqlx for async operations, and it
//! owns every transaction: the atomic ledger operations (sale creation,
//! payments, purchases, vendor payments) live here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopbook Data Flow                               │
//! │                                                                         │
//! │  Caller (form handler, report page)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shopbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌─────────┐  ┌───────────┐ │   │
//! │  │   │ Database  │  │ Repositories │  │ Ledger  │  │  Reports  │ │   │
//! │  │   │ (pool.rs) │  │ (reads/CRUD) │  │ (atomic │  │ (derived  │ │   │
//! │  │   │           │◄─│              │◄─│  ops)   │  │ aggregates│ │   │
//! │  │   └───────────┘  └──────────────┘  └─────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and ledger operation error types
//! - [`repository`] - Repository implementations (product, customer, ...)
//! - [`ledger`] - Atomic ledger operations with their transactions
//! - [`reports`] - Read-only dashboard aggregates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shopbook.db")).await?;
//!
//! // Atomic ledger operation
//! let created = db.ledger().create_sale(input).await?;
//!
//! // Read paths
//! let low = db.products().low_stock(20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, ErrorCode, LedgerOpError};
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};
pub use reports::ReportRepository;

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
pub use repository::vendor::VendorRepository;
