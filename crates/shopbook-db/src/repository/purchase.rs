//! # Purchase Repository
//!
//! Read paths for purchases, their items and the vendor payment ledger.
//!
//! Purchases have no stored status column. Every listing derives the status
//! from the amounts at read time, so a stale badge cannot exist.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use shopbook_core::{Purchase, PurchaseItem, SaleStatus, VendorPaymentHistory};

/// A purchase row decorated with its derived status and remaining due.
///
/// This is the shape list views and reports consume.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseListEntry {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub status: SaleStatus,
    pub due_cents: i64,
}

impl From<Purchase> for PurchaseListEntry {
    fn from(purchase: Purchase) -> Self {
        let status = purchase.status();
        let due_cents = purchase.due().cents();
        PurchaseListEntry {
            purchase,
            status,
            due_cents,
        }
    }
}

/// Repository for purchase read operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT
                id, vendor_id, date,
                total_amount_cents, amount_paid_cents,
                created_at
            FROM purchases
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lists purchases, newest business date first, with derived status.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<PurchaseListEntry>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT
                id, vendor_id, date,
                total_amount_cents, amount_paid_cents,
                created_at
            FROM purchases
            ORDER BY date DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases.into_iter().map(PurchaseListEntry::from).collect())
    }

    /// Lists purchases for a vendor, newest first, with derived status.
    pub async fn list_for_vendor(
        &self,
        vendor_id: &str,
        limit: u32,
    ) -> DbResult<Vec<PurchaseListEntry>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT
                id, vendor_id, date,
                total_amount_cents, amount_paid_cents,
                created_at
            FROM purchases
            WHERE vendor_id = ?1
            ORDER BY date DESC
            LIMIT ?2
            "#,
        )
        .bind(vendor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases.into_iter().map(PurchaseListEntry::from).collect())
    }

    /// Gets all items for a purchase.
    pub async fn get_items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT
                id, purchase_id, product_id,
                quantity, rate_cents, sell_rate_cents, total_cents,
                created_at
            FROM purchase_items
            WHERE purchase_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the vendor payment ledger for a vendor, oldest first.
    pub async fn get_vendor_payments(
        &self,
        vendor_id: &str,
    ) -> DbResult<Vec<VendorPaymentHistory>> {
        let payments = sqlx::query_as::<_, VendorPaymentHistory>(
            r#"
            SELECT
                id, vendor_id, purchase_id, date,
                total_cents, amount_paid_cents, dues_status, notes,
                created_at
            FROM vendor_payment_history
            WHERE vendor_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Purchase item ids a vendor payment was linked against.
    pub async fn get_payment_links(&self, vendor_payment_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT purchase_item_id
            FROM vendor_payment_links
            WHERE vendor_payment_id = ?1
            "#,
        )
        .bind(vendor_payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Total paid to a vendor according to the ledger rows.
    ///
    /// Used by drift checks: must agree with `vendors.amount_paid_cents`.
    pub async fn ledger_total_paid(&self, vendor_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_paid_cents)
            FROM vendor_payment_history
            WHERE vendor_id = ?1
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}
