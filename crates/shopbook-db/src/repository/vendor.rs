//! # Vendor Repository
//!
//! Database operations for vendors. Balance columns only move inside ledger
//! transactions; vendor deletion is guarded there too (a vendor with
//! purchases cannot be removed without corrupting the purchase ledger).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopbook_core::Vendor;

/// Repository for vendor database operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    /// Creates a new VendorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    /// Gets a vendor by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
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
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Lists vendors sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT
                id, name, phone_number,
                total_purchases_cents, amount_paid_cents, balance_cents,
                created_at, updated_at
            FROM vendors
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    /// Lists vendors the business still owes, largest balance first.
    pub async fn with_dues(&self, limit: u32) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT
                id, name, phone_number,
                total_purchases_cents, amount_paid_cents, balance_cents,
                created_at, updated_at
            FROM vendors
            WHERE balance_cents > 0
            ORDER BY balance_cents DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    /// Inserts a new vendor.
    pub async fn insert(&self, vendor: &Vendor) -> DbResult<()> {
        debug!(id = %vendor.id, name = %vendor.name, "Inserting vendor");

        sqlx::query(
            r#"
            INSERT INTO vendors (
                id, name, phone_number,
                total_purchases_cents, amount_paid_cents, balance_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.phone_number)
        .bind(vendor.total_purchases_cents)
        .bind(vendor.amount_paid_cents)
        .bind(vendor.balance_cents)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts vendors (for diagnostics and seed guards).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendors")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
