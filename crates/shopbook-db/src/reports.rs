//! # Report Aggregates
//!
//! Read-only aggregates for the dashboard: inventory value, outstanding
//! dues on both sides of the counter, low-stock alerts and a profit
//! estimate over a date range.
//!
//! Nothing here mutates; everything is derived from the rows the ledger
//! operations maintain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use shopbook_core::Product;

// =============================================================================
// Report Shapes
// =============================================================================

/// Stock on hand valued at cost and at retail.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryValue {
    pub product_count: i64,
    /// Σ quantity * cost_cents
    pub cost_value_cents: i64,
    /// Σ quantity * price_cents
    pub retail_value_cents: i64,
}

/// Outstanding dues on both sides of the counter.
#[derive(Debug, Clone, Serialize)]
pub struct DuesSummary {
    /// What customers owe the business.
    pub customer_dues_cents: i64,
    /// What the business owes vendors.
    pub vendor_dues_cents: i64,
}

/// Products at or below their low-stock threshold.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockReport {
    pub count: i64,
    pub products: Vec<Product>,
}

/// Sales revenue against cost of goods over a period.
///
/// Cost is valued at each product's CURRENT cost, not the cost at sale
/// time, so this is an estimate: restocking at a new rate shifts the
/// reported profit of past sales.
#[derive(Debug, Clone, Serialize)]
pub struct ProfitSummary {
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub profit_cents: i64,
}

/// Count and total over a period (sales or purchases).
#[derive(Debug, Clone, Serialize)]
pub struct PeriodTotals {
    pub count: i64,
    pub total_cents: i64,
}

// =============================================================================
// Report Repository
// =============================================================================

/// Repository for dashboard report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Values current stock at cost and at retail.
    pub async fn inventory_value(&self) -> DbResult<InventoryValue> {
        let (product_count, cost_value_cents, retail_value_cents): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(quantity * cost_cents), 0),
                    COALESCE(SUM(quantity * price_cents), 0)
                FROM products
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(InventoryValue {
            product_count,
            cost_value_cents,
            retail_value_cents,
        })
    }

    /// Sums outstanding customer and vendor dues.
    pub async fn dues_summary(&self) -> DbResult<DuesSummary> {
        let customer_dues_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(balance_cents), 0) FROM customers WHERE balance_cents > 0",
        )
        .fetch_one(&self.pool)
        .await?;

        let vendor_dues_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(balance_cents), 0) FROM vendors WHERE balance_cents > 0",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DuesSummary {
            customer_dues_cents,
            vendor_dues_cents,
        })
    }

    /// Products at or below their low-stock threshold.
    pub async fn low_stock(&self, limit: u32) -> DbResult<LowStockReport> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE quantity <= low_stock_threshold",
        )
        .fetch_one(&self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, category, unit,
                quantity, low_stock_threshold,
                cost_cents, price_cents,
                created_at, updated_at
            FROM products
            WHERE quantity <= low_stock_threshold
            ORDER BY quantity ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(LowStockReport { count, products })
    }

    /// Revenue, cost of goods and profit for sales in the inclusive
    /// date range.
    pub async fn profit_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<ProfitSummary> {
        let (revenue_cents, cost_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(si.total_cents), 0),
                COALESCE(SUM(si.quantity * p.cost_cents), 0)
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            WHERE s.date >= ?1 AND s.date <= ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProfitSummary {
            revenue_cents,
            cost_cents,
            profit_cents: revenue_cents - cost_cents,
        })
    }

    /// Sale count and sub-total sum for the inclusive date range.
    pub async fn sales_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<PeriodTotals> {
        let (count, total_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(sub_total_cents), 0)
            FROM sales
            WHERE date >= ?1 AND date <= ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodTotals { count, total_cents })
    }

    /// Purchase count and total sum for the inclusive date range.
    pub async fn purchases_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<PeriodTotals> {
        let (count, total_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount_cents), 0)
            FROM purchases
            WHERE date >= ?1 AND date <= ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodTotals { count, total_cents })
    }
}

// =============================================================================
// Tests
// =============================================================================
