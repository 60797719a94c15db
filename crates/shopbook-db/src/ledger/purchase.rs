//! # Purchase Ledger Operations
//!
//! Purchase creation and vendor payment recording, plus guarded vendor
//! deletion. The vendor invariant every path must preserve:
//!
//! ```text
//! vendors.balance_cents == total_purchases_cents - amount_paid_cents
//! ```
//!
//! Purchases increment the left side, payments the right; both adjust the
//! balance in the same transaction so the equality never breaks between
//! statements a reader can observe.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{DbError, LedgerOpResult};
use crate::repository::generate_id;
use shopbook_core::{
    validation, CreatePurchaseInput, DuesStatus, LedgerError, Money, Purchase, PurchaseItem,
    RecordVendorPaymentInput, Vendor, VendorPaymentHistory,
};

use super::{
    adjust_product_stock_and_rates, fetch_product, AppliedPurchasePayment, CreatedPurchase,
    Ledger, RecordedVendorPayment,
};

impl Ledger {
    /// Creates a purchase with its single item, restocks the product,
    /// updates the vendor totals and logs the vendor payment entry.
    ///
    /// ## Consistency Check
    /// `total_amount` must equal `quantity * rate` exactly; the entry form
    /// computes it, so a mismatch means the caller is confused and the
    /// operation refuses before any mutation.
    pub async fn create_purchase(
        &self,
        input: CreatePurchaseInput,
    ) -> LedgerOpResult<CreatedPurchase> {
        validation::validate_create_purchase(&input)?;

        let expected = input.quantity * input.rate_cents;
        if input.total_amount_cents != expected {
            return Err(LedgerError::TotalMismatch {
                expected,
                actual: input.total_amount_cents,
            }
            .into());
        }

        let total = Money::from_cents(input.total_amount_cents);
        let paid = Money::from_cents(input.amount_paid_cents);
        let now = Utc::now();

        debug!(
            vendor_id = %input.vendor_id,
            product_id = %input.product_id,
            total = %total,
            paid = %paid,
            "create_purchase"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut vendor = fetch_vendor(&mut tx, &input.vendor_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::VendorNotFound(input.vendor_id.clone()))?;

        let mut product = fetch_product(&mut tx, &input.product_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::ProductNotFound(input.product_id.clone()))?;

        let purchase = Purchase {
            id: generate_id(),
            vendor_id: vendor.id.clone(),
            date: input.date,
            total_amount_cents: total.cents(),
            amount_paid_cents: paid.cents(),
            created_at: now,
        };
        insert_purchase(&mut tx, &purchase).await.map_err(DbError::from)?;

        let item = PurchaseItem {
            id: generate_id(),
            purchase_id: purchase.id.clone(),
            product_id: product.id.clone(),
            quantity: input.quantity,
            rate_cents: input.rate_cents,
            sell_rate_cents: input.sell_rate_cents,
            total_cents: total.cents(),
            created_at: now,
        };
        insert_purchase_item(&mut tx, &item).await.map_err(DbError::from)?;

        // Vendor totals move together so the balance invariant holds.
        apply_purchase_to_vendor(&mut tx, &vendor.id, total.cents(), paid.cents(), now)
            .await
            .map_err(DbError::from)?;
        vendor.total_purchases_cents += total.cents();
        vendor.amount_paid_cents += paid.cents();
        vendor.balance_cents += total.cents() - paid.cents();
        vendor.updated_at = now;

        // Restock, and refresh the going rates from this purchase.
        adjust_product_stock_and_rates(
            &mut tx,
            &product.id,
            input.quantity,
            input.rate_cents,
            input.sell_rate_cents,
            now,
        )
        .await
        .map_err(DbError::from)?;
        product.quantity += input.quantity;
        product.cost_cents = input.rate_cents;
        product.price_cents = input.sell_rate_cents;
        product.updated_at = now;

        let payment = VendorPaymentHistory {
            id: generate_id(),
            vendor_id: vendor.id.clone(),
            purchase_id: Some(purchase.id.clone()),
            date: input.date,
            total_cents: total.cents(),
            amount_paid_cents: paid.cents(),
            dues_status: if paid >= total {
                DuesStatus::Cleared
            } else {
                DuesStatus::Pending
            },
            notes: None,
            created_at: now,
        };
        insert_vendor_payment(&mut tx, &payment).await.map_err(DbError::from)?;
        insert_payment_link(&mut tx, &payment.id, &item.id)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            purchase_id = %purchase.id,
            vendor = %vendor.name,
            total = %total,
            "Purchase created"
        );

        Ok(CreatedPurchase {
            purchase,
            item,
            vendor,
            product,
            payment,
        })
    }

    /// Records a payment to a vendor, optionally applying it against the
    /// given purchases strictly in the order supplied.
    ///
    /// ## Application Order
    /// No oldest-first resorting happens: the caller's order is the
    /// allocation order. Each purchase absorbs `min(remaining, due)` until
    /// the payment is exhausted.
    pub async fn record_vendor_payment(
        &self,
        input: RecordVendorPaymentInput,
    ) -> LedgerOpResult<RecordedVendorPayment> {
        validation::validate_record_vendor_payment(&input)?;

        let amount = Money::from_cents(input.amount_paid_cents);
        let now = Utc::now();

        debug!(
            vendor_id = %input.vendor_id,
            amount = %amount,
            purchases = input.purchase_ids.len(),
            "record_vendor_payment"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut vendor = fetch_vendor(&mut tx, &input.vendor_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::VendorNotFound(input.vendor_id.clone()))?;

        if amount > vendor.balance() {
            return Err(LedgerError::PaymentExceedsBalance {
                amount: amount.cents(),
                balance: vendor.balance_cents,
            }
            .into());
        }

        // Resolve the targeted purchases in caller order, checking
        // ownership before anything moves.
        let mut purchases = Vec::with_capacity(input.purchase_ids.len());
        for purchase_id in &input.purchase_ids {
            let purchase = fetch_purchase(&mut tx, purchase_id)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| LedgerError::PurchaseNotFound(purchase_id.clone()))?;

            if purchase.vendor_id != vendor.id {
                return Err(LedgerError::InvalidPurchaseReference {
                    purchase_id: purchase.id,
                    vendor_id: vendor.id,
                }
                .into());
            }

            purchases.push(purchase);
        }

        if !purchases.is_empty() {
            let selected_dues: i64 = purchases.iter().map(|p| p.due().cents()).sum();
            if amount.cents() > selected_dues {
                return Err(LedgerError::PaymentExceedsSelectedDues {
                    amount: amount.cents(),
                    dues: selected_dues,
                }
                .into());
            }
        }

        apply_payment_to_vendor(&mut tx, &vendor.id, amount.cents(), now)
            .await
            .map_err(DbError::from)?;
        vendor.amount_paid_cents += amount.cents();
        vendor.balance_cents -= amount.cents();
        vendor.updated_at = now;

        // Link the payment to every item of the referenced purchases.
        let mut linked_item_ids = Vec::new();
        let mut linked_total = 0;
        for purchase in &purchases {
            let items = fetch_purchase_items(&mut tx, &purchase.id)
                .await
                .map_err(DbError::from)?;
            for item in items {
                linked_total += item.total_cents;
                linked_item_ids.push(item.id);
            }
        }

        let payment = VendorPaymentHistory {
            id: generate_id(),
            vendor_id: vendor.id.clone(),
            purchase_id: None,
            date: input.date,
            // An untargeted payment records no total; it only settles the
            // vendor's aggregate balance.
            total_cents: if purchases.is_empty() {
                0
            } else {
                amount.cents()
            },
            amount_paid_cents: amount.cents(),
            dues_status: if amount.cents() >= linked_total {
                DuesStatus::Cleared
            } else {
                DuesStatus::Pending
            },
            notes: input.notes.clone(),
            created_at: now,
        };
        insert_vendor_payment(&mut tx, &payment).await.map_err(DbError::from)?;
        for item_id in &linked_item_ids {
            insert_payment_link(&mut tx, &payment.id, item_id)
                .await
                .map_err(DbError::from)?;
        }

        // Spread the payment across the purchases, caller order, partial
        // fills allowed, stop when exhausted.
        let mut remaining = amount;
        let mut applied = Vec::new();
        for purchase in &purchases {
            if remaining.is_zero() {
                break;
            }

            let apply = remaining.min(purchase.due());
            if apply.is_positive() {
                apply_payment_to_purchase(&mut tx, &purchase.id, apply.cents())
                    .await
                    .map_err(DbError::from)?;
                remaining -= apply;
                applied.push(AppliedPurchasePayment {
                    purchase_id: purchase.id.clone(),
                    applied_cents: apply.cents(),
                });
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            vendor = %vendor.name,
            amount = %amount,
            applied = applied.len(),
            "Vendor payment recorded"
        );

        Ok(RecordedVendorPayment {
            vendor,
            payment,
            applied,
        })
    }

    /// Deletes a vendor, refusing when any purchase references it.
    ///
    /// Removing a vendor with purchases would orphan the purchase ledger
    /// and silently corrupt the dues reports.
    pub async fn delete_vendor(&self, vendor_id: &str) -> LedgerOpResult<Vendor> {
        debug!(vendor_id = %vendor_id, "delete_vendor");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let vendor = fetch_vendor(&mut tx, vendor_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::VendorNotFound(vendor_id.to_string()))?;

        let purchase_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE vendor_id = ?1")
                .bind(vendor_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(DbError::from)?;

        if purchase_count > 0 {
            return Err(LedgerError::HasPurchases(vendor.id).into());
        }

        sqlx::query("DELETE FROM vendors WHERE id = ?1")
            .bind(vendor_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(vendor = %vendor.name, "Vendor deleted");

        Ok(vendor)
    }
}

// =============================================================================
// In-Transaction Helpers
// =============================================================================

async fn fetch_vendor(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Vendor>, sqlx::Error> {
    sqlx::query_as::<_, Vendor>(
        r#"
        SELECT
            id, name, phone_number,
            total_purchases_cents, amount_paid_cents, balance_cents,
            created_at, updated_at
        FROM vendors
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

async fn fetch_purchase(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Purchase>, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(
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
    .fetch_optional(conn)
    .await
}

async fn fetch_purchase_items(
    conn: &mut SqliteConnection,
    purchase_id: &str,
) -> Result<Vec<PurchaseItem>, sqlx::Error> {
    sqlx::query_as::<_, PurchaseItem>(
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
    .fetch_all(conn)
    .await
}

async fn insert_purchase(
    conn: &mut SqliteConnection,
    purchase: &Purchase,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO purchases (
            id, vendor_id, date,
            total_amount_cents, amount_paid_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.vendor_id)
    .bind(purchase.date)
    .bind(purchase.total_amount_cents)
    .bind(purchase.amount_paid_cents)
    .bind(purchase.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_purchase_item(
    conn: &mut SqliteConnection,
    item: &PurchaseItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO purchase_items (
            id, purchase_id, product_id,
            quantity, rate_cents, sell_rate_cents, total_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.purchase_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.rate_cents)
    .bind(item.sell_rate_cents)
    .bind(item.total_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_purchase_to_vendor(
    conn: &mut SqliteConnection,
    vendor_id: &str,
    total_cents: i64,
    paid_cents: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE vendors SET
            total_purchases_cents = total_purchases_cents + ?2,
            amount_paid_cents = amount_paid_cents + ?3,
            balance_cents = balance_cents + ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(vendor_id)
    .bind(total_cents)
    .bind(paid_cents)
    .bind(total_cents - paid_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_payment_to_vendor(
    conn: &mut SqliteConnection,
    vendor_id: &str,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE vendors SET
            amount_paid_cents = amount_paid_cents + ?2,
            balance_cents = balance_cents - ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(vendor_id)
    .bind(amount_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_payment_to_purchase(
    conn: &mut SqliteConnection,
    purchase_id: &str,
    amount_cents: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE purchases SET
            amount_paid_cents = amount_paid_cents + ?2
        WHERE id = ?1
        "#,
    )
    .bind(purchase_id)
    .bind(amount_cents)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_vendor_payment(
    conn: &mut SqliteConnection,
    payment: &VendorPaymentHistory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO vendor_payment_history (
            id, vendor_id, purchase_id, date,
            total_cents, amount_paid_cents, dues_status, notes,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.vendor_id)
    .bind(&payment.purchase_id)
    .bind(payment.date)
    .bind(payment.total_cents)
    .bind(payment.amount_paid_cents)
    .bind(payment.dues_status)
    .bind(&payment.notes)
    .bind(payment.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_payment_link(
    conn: &mut SqliteConnection,
    vendor_payment_id: &str,
    purchase_item_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO vendor_payment_links (vendor_payment_id, purchase_item_id)
        VALUES (?1, ?2)
        "#,
    )
    .bind(vendor_payment_id)
    .bind(purchase_item_id)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
