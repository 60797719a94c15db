//! # Repository Module
//!
//! Database repository implementations for Shopbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.products().low_stock(20)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── low_stock(&self, limit)                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories carry the read paths and independent CRUD. Anything that
//! must mutate several tables together lives in [`crate::ledger`], which
//! owns its transactions.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, search, low stock
//! - [`customer::CustomerRepository`] - Customer CRUD and find-or-create key
//! - [`vendor::VendorRepository`] - Vendor CRUD
//! - [`sale::SaleRepository`] - Sale reads with items and payment history
//! - [`purchase::PurchaseRepository`] - Purchase reads with derived status

pub mod customer;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod vendor;

/// Generates a new entity ID (UUID v4 string).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
