//! # Sale Repository
//!
//! Read paths for sales, their items and their payment ledger.
//!
//! Writes are conspicuously absent: a sale only ever changes inside the
//! ledger transactions ([`crate::ledger`]), together with the product,
//! customer and payment rows it must stay consistent with.

use sqlx::SqlitePool;

use crate::error::DbResult;
use shopbook_core::{PaymentHistory, Sale, SaleItem};

/// Repository for sale read operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, invoice_number, customer_id, date,
                sub_total_cents, amount_paid_cents, due_amount_cents,
                status, payment_method,
                created_at, updated_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, invoice_number, customer_id, date,
                sub_total_cents, amount_paid_cents, due_amount_cents,
                status, payment_method,
                created_at, updated_at
            FROM sales
            WHERE invoice_number = ?1
            "#,
        )
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales, newest business date first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, invoice_number, customer_id, date,
                sub_total_cents, amount_paid_cents, due_amount_cents,
                status, payment_method,
                created_at, updated_at
            FROM sales
            ORDER BY date DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales for a customer, newest first.
    pub async fn list_for_customer(&self, customer_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, invoice_number, customer_id, date,
                sub_total_cents, amount_paid_cents, due_amount_cents,
                status, payment_method,
                created_at, updated_at
            FROM sales
            WHERE customer_id = ?1
            ORDER BY date DESC
            LIMIT ?2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, product_id,
                quantity, unit_price_cents, discount_cents, total_cents,
                created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the payment ledger for a sale, oldest first.
    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<PaymentHistory>> {
        let payments = sqlx::query_as::<_, PaymentHistory>(
            r#"
            SELECT
                id, sale_id, date,
                amount_paid_cents, due_before_cents, balance_after_cents,
                payment_method, created_at
            FROM payment_history
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Total paid against a sale according to the ledger rows.
    ///
    /// Used by drift checks: must agree with `sales.amount_paid_cents`.
    pub async fn ledger_total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_paid_cents)
            FROM payment_history
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}
