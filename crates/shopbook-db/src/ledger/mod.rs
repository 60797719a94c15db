//! # Ledger Operations
//!
//! The atomic operations that keep the books consistent. Everything that
//! touches more than one table goes through here, inside one transaction.
//!
//! ## The Consistency Problem
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              What one recorded sale has to touch                        │
//! │                                                                         │
//! │  create_sale(items, paid)                                              │
//! │       │                                                                 │
//! │       ├── sales            + 1 row   (sub_total, due, status)          │
//! │       ├── sale_items       + N rows  (frozen line totals)              │
//! │       ├── products         quantity - N per line                       │
//! │       ├── customers        balance + due, totals updated               │
//! │       └── payment_history  + 1 row   (when paid > 0)                   │
//! │                                                                         │
//! │  Any failure mid-way must leave ALL of these untouched. Hence one      │
//! │  transaction per operation, with every business-rule check run on      │
//! │  rows re-read inside that transaction.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation               | Touches                                        |
//! |-------------------------|------------------------------------------------|
//! | `create_sale`           | sales, sale_items, products, customers, ledger |
//! | `record_sale_payment`   | sales, customers, payment_history              |
//! | `delete_sale`           | sales, sale_items, customers                   |
//! | `create_purchase`       | purchases, items, products, vendors, ledger    |
//! | `record_vendor_payment` | vendors, purchases, vendor ledger, links       |
//! | `delete_vendor`         | vendors (guarded)                              |

mod purchase;
mod sale;

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use shopbook_core::{
    Customer, PaymentHistory, Product, Purchase, PurchaseItem, Sale, SaleItem, Vendor,
    VendorPaymentHistory,
};

// =============================================================================
// Ledger Handle
// =============================================================================

/// Entry point for the atomic ledger operations.
///
/// Obtained via `Database::ledger()`. Each method opens its own transaction
/// and either commits every effect or none of them.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) pool: SqlitePool,
}

impl Ledger {
    /// Creates a new Ledger handle.
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }
}

// =============================================================================
// Operation Results
// =============================================================================
// Each operation returns the full graph it created or updated, so callers
// can render without a second round trip.

/// Result of [`Ledger::create_sale`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub customer: Customer,
    /// Present when the sale was created with a non-zero initial payment.
    pub payment: Option<PaymentHistory>,
}

/// Result of [`Ledger::record_sale_payment`].
#[derive(Debug, Clone, Serialize)]
pub struct RecordedSalePayment {
    pub sale: Sale,
    pub customer: Customer,
    pub payment: PaymentHistory,
}

/// Result of [`Ledger::delete_sale`]: the rows removed and the customer
/// with the sale's effect reversed.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub customer: Customer,
}

/// Result of [`Ledger::create_purchase`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPurchase {
    pub purchase: Purchase,
    pub item: PurchaseItem,
    pub vendor: Vendor,
    pub product: Product,
    pub payment: VendorPaymentHistory,
}

/// How much of a vendor payment landed on one purchase.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedPurchasePayment {
    pub purchase_id: String,
    pub applied_cents: i64,
}

/// Result of [`Ledger::record_vendor_payment`].
#[derive(Debug, Clone, Serialize)]
pub struct RecordedVendorPayment {
    pub vendor: Vendor,
    pub payment: VendorPaymentHistory,
    /// Per-purchase application, in the order the caller supplied them.
    pub applied: Vec<AppliedPurchasePayment>,
}

// =============================================================================
// Invoice Numbers
// =============================================================================

/// Generates an invoice number: `INV-YYMMDD-HHMMSS-NNNN`.
///
/// Time plus a sub-second suffix makes collisions rare, not impossible; the
/// UNIQUE constraint on `sales.invoice_number` is the actual guarantee and
/// the insert path retries once with a fresh number on conflict.
pub(crate) fn generate_invoice_number() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let suffix = nanos % 10_000;
    format!("INV-{}-{:04}", now.format("%y%m%d-%H%M%S"), suffix)
}

// =============================================================================
// Shared In-Transaction Reads
// =============================================================================
// Repositories read through the pool; these run on the transaction's
// connection so checks see the snapshot the mutation will commit against.

/// Fetches a product on the transaction connection.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id, name, category, unit,
            quantity, low_stock_threshold,
            cost_cents, price_cents,
            created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Restocks a product and refreshes its cost/price to the purchase's rates.
pub(crate) async fn adjust_product_stock_and_rates(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity_delta: i64,
    cost_cents: i64,
    price_cents: i64,
    now: chrono::DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE products SET
            quantity = quantity + ?2,
            cost_cents = ?3,
            price_cents = ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(quantity_delta)
    .bind(cost_cents)
    .bind(price_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_shape() {
        let invoice = generate_invoice_number();
        assert!(invoice.starts_with("INV-"));
        // INV- + 6 date + 1 dash + 6 time + 1 dash + 4 suffix
        assert_eq!(invoice.len(), "INV-".len() + 6 + 1 + 6 + 1 + 4);
    }
}
