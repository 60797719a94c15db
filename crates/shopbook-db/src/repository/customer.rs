//! # Customer Repository
//!
//! Database operations for customers.
//!
//! The (name, phone_number) pair doubles as the find-or-create key used by
//! sale entry; balance columns only move inside ledger transactions.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopbook_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, phone_number,
                balance_cents, total_sales_cents, amount_paid_cents,
                created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Finds a customer by exact name and phone number.
    ///
    /// This is the match key sale entry uses before creating a new customer.
    pub async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone_number: &str,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, phone_number,
                balance_cents, total_sales_cents, amount_paid_cents,
                created_at, updated_at
            FROM customers
            WHERE name = ?1 AND phone_number = ?2
            "#,
        )
        .bind(name)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, phone_number,
                balance_cents, total_sales_cents, amount_paid_cents,
                created_at, updated_at
            FROM customers
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Lists customers with outstanding dues, largest first.
    pub async fn with_dues(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, phone_number,
                balance_cents, total_sales_cents, amount_paid_cents,
                created_at, updated_at
            FROM customers
            WHERE balance_cents > 0
            ORDER BY balance_cents DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone_number,
                balance_cents, total_sales_cents, amount_paid_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(customer.balance_cents)
        .bind(customer.total_sales_cents)
        .bind(customer.amount_paid_cents)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts customers (for diagnostics and seed guards).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
