//! # shopbook-core: Pure Business Logic for Shopbook
//!
//! This crate is the **heart** of Shopbook, a small-business bookkeeping
//! engine for inventory, sales, purchases and payment histories. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopbook Data Flow                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation Layer (out of scope)                 │   │
//! │  │    forms ──► list views ──► dashboard ──► reports               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ derivation│  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │           │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopbook-db (Database Layer)                    │   │
//! │  │       SQLite, repositories, atomic ledger transactions          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Vendor, Customer, Sale, Purchase, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`status`] - Payment status derivation shared by sales and purchases
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use shopbook_core::money::Money;
//! use shopbook_core::status::derive_status;
//! use shopbook_core::types::SaleStatus;
//!
//! // Create money from cents (never from floats!)
//! let total = Money::from_cents(34_000); // 340.00
//! let paid = Money::from_cents(20_000);  // 200.00
//!
//! // A partially paid sale stays open
//! assert_eq!(derive_status(total, paid), SaleStatus::PartiallyPaid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopbook_core::Money` instead of
// `use shopbook_core::money::Money`

pub use error::{LedgerError, ValidationError};
pub use money::Money;
pub use status::{derive_status, status_after_payment};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway invoices and keeps entry forms honest.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 100000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 999_999;
