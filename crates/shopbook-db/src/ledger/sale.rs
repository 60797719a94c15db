//! # Sale Ledger Operations
//!
//! Sale creation, payment recording and guarded deletion. Each operation is
//! one transaction; the money math itself lives in shopbook-core.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_sale() → Sale { status: pending | partially_paid |      │
//! │                                completed }  + items + stock moves      │
//! │                                                                         │
//! │  2. PAYMENTS (zero or more)                                            │
//! │     └── record_sale_payment() → payment_history row, balances move     │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                  │
//! │     └── delete_sale() → only while NO payment history exists           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{DbError, LedgerOpResult};
use crate::repository::generate_id;
use shopbook_core::{
    derive_status, status_after_payment, validation, CreateSaleInput, Customer, CustomerRef,
    LedgerError, Money, PaymentHistory, RecordSalePaymentInput, Sale, SaleItem, SaleStatus,
};

use super::{fetch_product, generate_invoice_number, CreatedSale, DeletedSale, Ledger,
    RecordedSalePayment};

impl Ledger {
    /// Creates a sale with its items, moves stock, updates the customer and
    /// records the initial payment when there is one.
    ///
    /// ## Atomicity
    /// Validation failures return before the transaction opens. Inside the
    /// transaction, any missing product/customer or stock shortage rolls
    /// everything back: no partial stock decrement, no orphaned sale row.
    ///
    /// ## Customer Resolution
    /// `CustomerRef::Existing` must resolve or the operation fails.
    /// `CustomerRef::NewByNameAndPhone` reuses an exact (name, phone) match
    /// when one exists, otherwise inserts a new customer whose opening
    /// balance IS this sale's due; an existing customer instead has its
    /// running totals incremented. Exactly one of the two happens, so the
    /// due is never counted twice.
    pub async fn create_sale(&self, input: CreateSaleInput) -> LedgerOpResult<CreatedSale> {
        validation::validate_create_sale(&input)?;

        let sub_total = input.sub_total();
        let paid = Money::from_cents(input.amount_paid_cents);
        let due = sub_total - paid;
        let status = derive_status(sub_total, paid);
        let now = Utc::now();

        debug!(
            items = input.items.len(),
            sub_total = %sub_total,
            paid = %paid,
            "create_sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Re-fetch every referenced product inside the transaction; the
        // stock check must run against the snapshot we will commit with.
        for line in &input.items {
            let product = fetch_product(&mut tx, &line.product_id)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| LedgerError::ProductNotFound(line.product_id.clone()))?;

            if !product.can_sell(line.quantity) {
                return Err(LedgerError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // Resolve the customer once, up front.
        let (mut customer, preexisting) = match &input.customer {
            CustomerRef::Existing { id } => {
                let customer = fetch_customer(&mut tx, id)
                    .await
                    .map_err(DbError::from)?
                    .ok_or_else(|| LedgerError::CustomerNotFound(id.clone()))?;
                (customer, true)
            }
            CustomerRef::NewByNameAndPhone { name, phone_number } => {
                let name = name.trim().to_string();
                let phone_number = phone_number.trim().to_string();

                match find_customer_by_name_and_phone(&mut tx, &name, &phone_number)
                    .await
                    .map_err(DbError::from)?
                {
                    Some(customer) => (customer, true),
                    None => {
                        let customer = Customer {
                            id: generate_id(),
                            name,
                            phone_number,
                            balance_cents: due.cents(),
                            total_sales_cents: sub_total.cents(),
                            amount_paid_cents: paid.cents(),
                            created_at: now,
                            updated_at: now,
                        };
                        insert_customer(&mut tx, &customer)
                            .await
                            .map_err(DbError::from)?;
                        (customer, false)
                    }
                }
            }
        };

        // Insert the sale row. The invoice number is probabilistically
        // unique; the UNIQUE constraint is authoritative and we retry once
        // with a fresh number if we lose that bet.
        let sale = Sale {
            id: generate_id(),
            invoice_number: generate_invoice_number(),
            customer_id: customer.id.clone(),
            date: input.date,
            sub_total_cents: sub_total.cents(),
            amount_paid_cents: paid.cents(),
            due_amount_cents: due.cents(),
            status,
            payment_method: input.payment_method,
            created_at: now,
            updated_at: now,
        };
        let sale = insert_sale_with_retry(&mut tx, sale).await?;

        // Items + stock moves.
        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let item = SaleItem {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                discount_cents: line.discount_cents,
                total_cents: line.total().cents(),
                created_at: now,
            };
            insert_sale_item(&mut tx, &item).await.map_err(DbError::from)?;

            adjust_product_stock(&mut tx, &line.product_id, -line.quantity, now)
                .await
                .map_err(DbError::from)?;

            items.push(item);
        }

        // A customer that already existed absorbs this sale into its
        // running totals. A brand-new one was created with them set.
        if preexisting {
            apply_sale_to_customer(
                &mut tx,
                &customer.id,
                sub_total.cents(),
                paid.cents(),
                due.cents(),
                now,
            )
            .await
            .map_err(DbError::from)?;

            customer.total_sales_cents += sub_total.cents();
            customer.amount_paid_cents += paid.cents();
            customer.balance_cents += due.cents();
            customer.updated_at = now;
        }

        // An upfront payment goes straight into the append-only ledger.
        let payment = if paid.is_positive() {
            let payment = PaymentHistory {
                id: generate_id(),
                sale_id: sale.id.clone(),
                date: input.date,
                amount_paid_cents: paid.cents(),
                due_before_cents: sub_total.cents(),
                balance_after_cents: due.cents(),
                payment_method: input.payment_method,
                created_at: now,
            };
            insert_payment_history(&mut tx, &payment)
                .await
                .map_err(DbError::from)?;
            Some(payment)
        } else {
            None
        };

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_number,
            sub_total = %sub_total,
            due = %due,
            "Sale created"
        );

        Ok(CreatedSale {
            sale,
            items,
            customer,
            payment,
        })
    }

    /// Records a payment against a sale and moves the sale and customer
    /// balances together.
    ///
    /// ## Checks (all inside the transaction)
    /// - sale exists, and belongs to the named customer
    /// - the amount does not exceed the sale's remaining due
    pub async fn record_sale_payment(
        &self,
        input: RecordSalePaymentInput,
    ) -> LedgerOpResult<RecordedSalePayment> {
        validation::validate_record_sale_payment(&input)?;

        let amount = Money::from_cents(input.amount_paid_cents);
        let now = Utc::now();

        debug!(sale_id = %input.sale_id, amount = %amount, "record_sale_payment");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut sale = fetch_sale(&mut tx, &input.sale_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::SaleNotFound(input.sale_id.clone()))?;

        if sale.customer_id != input.customer_id {
            return Err(LedgerError::CustomerMismatch {
                sale_id: sale.id,
                customer_id: input.customer_id,
            }
            .into());
        }

        let due_before = sale.sub_total() - sale.amount_paid();
        if amount > due_before {
            return Err(LedgerError::PaymentExceedsBalance {
                amount: amount.cents(),
                balance: due_before.cents(),
            }
            .into());
        }

        let balance_after = due_before - amount;
        // The open branch inspects the PRE-payment paid amount; see
        // shopbook_core::status::status_after_payment.
        let new_status = status_after_payment(sale.amount_paid(), balance_after);

        let payment = PaymentHistory {
            id: generate_id(),
            sale_id: sale.id.clone(),
            date: input.date,
            amount_paid_cents: amount.cents(),
            due_before_cents: due_before.cents(),
            balance_after_cents: balance_after.cents(),
            payment_method: input.payment_method,
            created_at: now,
        };
        insert_payment_history(&mut tx, &payment)
            .await
            .map_err(DbError::from)?;

        apply_payment_to_sale(&mut tx, &sale.id, amount.cents(), new_status, now)
            .await
            .map_err(DbError::from)?;

        apply_payment_to_customer(&mut tx, &sale.customer_id, amount.cents(), now)
            .await
            .map_err(DbError::from)?;

        let customer = fetch_customer(&mut tx, &sale.customer_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::CustomerNotFound(sale.customer_id.clone()))?;

        tx.commit().await.map_err(DbError::from)?;

        sale.amount_paid_cents += amount.cents();
        sale.due_amount_cents -= amount.cents();
        sale.status = new_status;
        sale.updated_at = now;

        info!(
            sale_id = %sale.id,
            amount = %amount,
            remaining = %balance_after,
            status = ?new_status,
            "Sale payment recorded"
        );

        Ok(RecordedSalePayment {
            sale,
            customer,
            payment,
        })
    }

    /// Deletes a sale and its items, reversing the customer balance impact.
    ///
    /// ## Guard
    /// Refused with `HasPaymentHistory` once any payment is on the ledger;
    /// deleting would orphan append-only rows.
    ///
    /// ## Note
    /// Stock is NOT restored: a deleted sale forfeits its stock movement.
    /// That matches the books this replaces; revisit only as an explicit
    /// product decision.
    pub async fn delete_sale(&self, sale_id: &str) -> LedgerOpResult<DeletedSale> {
        debug!(sale_id = %sale_id, "delete_sale");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sale = fetch_sale(&mut tx, sale_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::SaleNotFound(sale_id.to_string()))?;

        let payment_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payment_history WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(DbError::from)?;

        if payment_count > 0 {
            return Err(LedgerError::HasPaymentHistory(sale.id).into());
        }

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
        .fetch_all(&mut *tx)
        .await
        .map_err(DbError::from)?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        // Exactly reverse the effect the sale had at creation.
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE customers SET
                total_sales_cents = total_sales_cents - ?2,
                amount_paid_cents = amount_paid_cents - ?3,
                balance_cents = balance_cents - ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&sale.customer_id)
        .bind(sale.sub_total_cents)
        .bind(sale.amount_paid_cents)
        .bind(sale.sub_total_cents - sale.amount_paid_cents)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let customer = fetch_customer(&mut tx, &sale.customer_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| LedgerError::CustomerNotFound(sale.customer_id.clone()))?;

        tx.commit().await.map_err(DbError::from)?;

        info!(sale_id = %sale.id, invoice = %sale.invoice_number, "Sale deleted");

        Ok(DeletedSale {
            sale,
            items,
            customer,
        })
    }
}

// =============================================================================
// In-Transaction Helpers
// =============================================================================

pub(super) async fn fetch_sale(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Sale>, sqlx::Error> {
    sqlx::query_as::<_, Sale>(
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
    .fetch_optional(conn)
    .await
}

pub(super) async fn fetch_customer(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
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
    .fetch_optional(conn)
    .await
}

async fn find_customer_by_name_and_phone(
    conn: &mut SqliteConnection,
    name: &str,
    phone_number: &str,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
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
    .fetch_optional(conn)
    .await
}

async fn insert_customer(
    conn: &mut SqliteConnection,
    customer: &Customer,
) -> Result<(), sqlx::Error> {
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
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts the sale row, regenerating the invoice number once if the
/// UNIQUE constraint fires.
async fn insert_sale_with_retry(
    conn: &mut SqliteConnection,
    mut sale: Sale,
) -> LedgerOpResult<Sale> {
    for attempt in 0..2 {
        match insert_sale(&mut *conn, &sale).await {
            Ok(()) => return Ok(sale),
            Err(err) => {
                let db_err = DbError::from(err);
                if attempt == 0 && db_err.is_unique_violation_on("invoice_number") {
                    debug!(invoice = %sale.invoice_number, "Invoice collision, regenerating");
                    sale.invoice_number = generate_invoice_number();
                    continue;
                }
                return Err(db_err.into());
            }
        }
    }

    // Two collisions in a row means something else is wrong.
    Err(DbError::UniqueViolation {
        field: "sales.invoice_number".to_string(),
        value: sale.invoice_number,
    }
    .into())
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, invoice_number, customer_id, date,
            sub_total_cents, amount_paid_cents, due_amount_cents,
            status, payment_method,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(&sale.customer_id)
    .bind(sale.date)
    .bind(sale.sub_total_cents)
    .bind(sale.amount_paid_cents)
    .bind(sale.due_amount_cents)
    .bind(sale.status)
    .bind(sale.payment_method)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_sale_item(
    conn: &mut SqliteConnection,
    item: &SaleItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id,
            quantity, unit_price_cents, discount_cents, total_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_cents)
    .bind(item.total_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Moves product stock by `delta` (negative for sales, positive for
/// purchases).
pub(super) async fn adjust_product_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE products SET
            quantity = quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_sale_to_customer(
    conn: &mut SqliteConnection,
    customer_id: &str,
    sub_total_cents: i64,
    paid_cents: i64,
    due_cents: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE customers SET
            total_sales_cents = total_sales_cents + ?2,
            amount_paid_cents = amount_paid_cents + ?3,
            balance_cents = balance_cents + ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(sub_total_cents)
    .bind(paid_cents)
    .bind(due_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

pub(super) async fn insert_payment_history(
    conn: &mut SqliteConnection,
    payment: &PaymentHistory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payment_history (
            id, sale_id, date,
            amount_paid_cents, due_before_cents, balance_after_cents,
            payment_method, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.sale_id)
    .bind(payment.date)
    .bind(payment.amount_paid_cents)
    .bind(payment.due_before_cents)
    .bind(payment.balance_after_cents)
    .bind(payment.payment_method)
    .bind(payment.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_payment_to_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
    amount_cents: i64,
    status: SaleStatus,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE sales SET
            amount_paid_cents = amount_paid_cents + ?2,
            due_amount_cents = due_amount_cents - ?2,
            status = ?3,
            updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(sale_id)
    .bind(amount_cents)
    .bind(status)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

async fn apply_payment_to_customer(
    conn: &mut SqliteConnection,
    customer_id: &str,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE customers SET
            balance_cents = balance_cents - ?2,
            amount_paid_cents = amount_paid_cents + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(amount_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::LedgerOpError;
    use crate::testutil::{line, sale_input, seed_customer, seed_product, test_db};
    use chrono::Utc;
    use shopbook_core::{
        CustomerRef, LedgerError, PaymentMethod, RecordSalePaymentInput, SaleStatus,
    };

    fn payment_input(
        sale_id: &str,
        customer_id: &str,
        amount_cents: i64,
    ) -> RecordSalePaymentInput {
        RecordSalePaymentInput {
            sale_id: sale_id.to_string(),
            customer_id: customer_id.to_string(),
            amount_paid_cents: amount_cents,
            date: Utc::now(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_create_sale_partial_payment() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let sugar = seed_product(&db, "Sugar 1kg", 10, 3_000, 5_000).await;
        let customer = seed_customer(&db, "Ayesha", "0300-1111111").await;

        // 3 @ 100.00 less 10.00 discount, plus 1 @ 50.00, paid 200.00
        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 3, 10_000, 1_000), line(&sugar.id, 1, 5_000, 0)],
                20_000,
            ))
            .await
            .unwrap();

        assert_eq!(created.sale.sub_total_cents, 34_000);
        assert_eq!(created.sale.due_amount_cents, 14_000);
        assert_eq!(created.sale.status, SaleStatus::PartiallyPaid);
        assert_eq!(created.items.len(), 2);

        // One ledger row with the pre/post dues frozen in
        let payment = created.payment.as_ref().expect("initial payment recorded");
        assert_eq!(payment.due_before_cents, 34_000);
        assert_eq!(payment.balance_after_cents, 14_000);

        // Stock moved
        let tea_after = db.products().get_by_id(&tea.id).await.unwrap().unwrap();
        let sugar_after = db.products().get_by_id(&sugar.id).await.unwrap().unwrap();
        assert_eq!(tea_after.quantity, 7);
        assert_eq!(sugar_after.quantity, 9);

        // Customer absorbed the due
        assert_eq!(created.customer.balance_cents, 14_000);
        assert_eq!(created.customer.total_sales_cents, 34_000);
        assert_eq!(created.customer.amount_paid_cents, 20_000);

        // The graph serializes the way list views consume it
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["sale"]["status"], "partially_paid");
        assert_eq!(json["payment"]["due_before_cents"], 34_000);
    }

    #[tokio::test]
    async fn test_create_sale_on_credit_has_no_payment_row() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Bilal", "0300-2222222").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();

        assert_eq!(created.sale.status, SaleStatus::Pending);
        assert!(created.payment.is_none());
        assert!(db
            .sales()
            .get_payments(&created.sale.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_sale_fully_paid_is_completed() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Dawood", "0300-3333333").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                20_000,
            ))
            .await
            .unwrap();

        assert_eq!(created.sale.status, SaleStatus::Completed);
        assert_eq!(created.sale.due_amount_cents, 0);
        assert_eq!(created.customer.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_create_sale_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 5, 6_000, 10_000).await;
        let sugar = seed_product(&db, "Sugar 1kg", 10, 3_000, 5_000).await;
        let customer = seed_customer(&db, "Erum", "0300-4444444").await;

        let err = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&sugar.id, 2, 5_000, 0), line(&tea.id, 6, 10_000, 0)],
                0,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::InsufficientStock { requested: 6, .. })
        ));

        // Nothing persisted: no sale row, stock untouched on BOTH products
        assert!(db.sales().list(10).await.unwrap().is_empty());
        let tea_after = db.products().get_by_id(&tea.id).await.unwrap().unwrap();
        let sugar_after = db.products().get_by_id(&sugar.id).await.unwrap().unwrap();
        assert_eq!(tea_after.quantity, 5);
        assert_eq!(sugar_after.quantity, 10);

        let customer_after = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(customer_after.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_create_sale_unknown_product() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Farah", "0300-5555555").await;

        let err = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line("7b1a2c9e-0d5f-4c3b-9a8e-111111111111", 1, 1_000, 0)],
                0,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_sale_finds_or_creates_customer() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;

        // First sale creates the customer with the due as opening balance
        let first = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::NewByNameAndPhone {
                    name: "Ghazala".to_string(),
                    phone_number: "0300-6666666".to_string(),
                },
                vec![line(&tea.id, 1, 10_000, 0)],
                4_000,
            ))
            .await
            .unwrap();

        assert_eq!(first.customer.balance_cents, 6_000);
        assert_eq!(first.customer.total_sales_cents, 10_000);

        // Second sale with the same name+phone reuses that customer
        let second = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::NewByNameAndPhone {
                    name: "Ghazala".to_string(),
                    phone_number: "0300-6666666".to_string(),
                },
                vec![line(&tea.id, 1, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();

        assert_eq!(second.customer.id, first.customer.id);
        assert_eq!(second.customer.balance_cents, 16_000);
        assert_eq!(second.customer.total_sales_cents, 20_000);
        assert_eq!(db.customers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_payment_settles_sale() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let sugar = seed_product(&db, "Sugar 1kg", 10, 3_000, 5_000).await;
        let customer = seed_customer(&db, "Hina", "0300-7777777").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 3, 10_000, 1_000), line(&sugar.id, 1, 5_000, 0)],
                20_000,
            ))
            .await
            .unwrap();

        // Pay off the remaining 140.00
        let recorded = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &customer.id, 14_000))
            .await
            .unwrap();

        assert_eq!(recorded.sale.due_amount_cents, 0);
        assert_eq!(recorded.sale.amount_paid_cents, 34_000);
        assert_eq!(recorded.sale.status, SaleStatus::Completed);
        assert_eq!(recorded.payment.due_before_cents, 14_000);
        assert_eq!(recorded.payment.balance_after_cents, 0);

        // Customer dues dropped by exactly the payment
        assert_eq!(recorded.customer.balance_cents, 0);
        assert_eq!(recorded.customer.amount_paid_cents, 34_000);

        // Stored amounts agree with the append-only ledger
        assert_eq!(
            db.sales().ledger_total_paid(&created.sale.id).await.unwrap(),
            34_000
        );
    }

    #[tokio::test]
    async fn test_record_payment_exceeding_due_is_rejected() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Iqra", "0300-8888888").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                5_000,
            ))
            .await
            .unwrap();

        let err = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &customer.id, 15_001))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::PaymentExceedsBalance {
                amount: 15_001,
                balance: 15_000,
            })
        ));

        // Nothing moved
        let sale = db.sales().get_by_id(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(sale.amount_paid_cents, 5_000);
        assert_eq!(db.sales().get_payments(&sale.id).await.unwrap().len(), 1);
        let customer_after = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(customer_after.balance_cents, 15_000);
    }

    #[tokio::test]
    async fn test_record_payment_customer_mismatch() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let owner = seed_customer(&db, "Javed", "0300-9999999").await;
        let other = seed_customer(&db, "Kiran", "0300-0000000").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: owner.id.clone(),
                },
                vec![line(&tea.id, 1, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();

        let err = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &other.id, 1_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::CustomerMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_payment_never_exceeds_sub_total() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Lubna", "0311-1111111").await;

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();

        // Two partial payments up to the exact sub total succeed
        let first = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &customer.id, 12_000))
            .await
            .unwrap();
        // The open branch looks at the PRE-payment paid amount, which was
        // zero here, so the sale still reports Pending despite the money
        assert_eq!(first.sale.status, SaleStatus::Pending);
        let second = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &customer.id, 8_000))
            .await
            .unwrap();
        assert_eq!(second.sale.amount_paid_cents, 20_000);
        assert_eq!(second.sale.status, SaleStatus::Completed);

        // A third payment of any size is rejected
        let err = db
            .ledger()
            .record_sale_payment(payment_input(&created.sale.id, &customer.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::PaymentExceedsBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_sale_blocked_by_payment_history() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Maha", "0312-2222222").await;

        // Initial payment at creation already writes a ledger row
        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 1, 10_000, 0)],
                5_000,
            ))
            .await
            .unwrap();

        let err = db.ledger().delete_sale(&created.sale.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::HasPaymentHistory(_))
        ));

        // Sale survives
        assert!(db.sales().get_by_id(&created.sale.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_sale_reverses_customer_exactly() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 10, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Nida", "0313-3333333").await;

        let before = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();

        let created = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();

        let deleted = db.ledger().delete_sale(&created.sale.id).await.unwrap();

        // Customer aggregates back to where they started
        assert_eq!(deleted.customer.balance_cents, before.balance_cents);
        assert_eq!(deleted.customer.total_sales_cents, before.total_sales_cents);
        assert_eq!(deleted.customer.amount_paid_cents, before.amount_paid_cents);

        // Rows are gone
        assert!(db.sales().get_by_id(&created.sale.id).await.unwrap().is_none());
        assert!(db.sales().get_items(&created.sale.id).await.unwrap().is_empty());

        // Stock is NOT restored
        let tea_after = db.products().get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(tea_after.quantity, 8);
    }

    #[tokio::test]
    async fn test_delete_missing_sale() {
        let db = test_db().await;
        let err = db
            .ledger()
            .delete_sale("7b1a2c9e-0d5f-4c3b-9a8e-222222222222")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerOpError::Ledger(LedgerError::SaleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_customer_balance_agrees_with_ledger() {
        let db = test_db().await;
        let tea = seed_product(&db, "Green Tea", 50, 6_000, 10_000).await;
        let customer = seed_customer(&db, "Omar", "0314-4444444").await;

        let first = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 3, 10_000, 0)],
                10_000,
            ))
            .await
            .unwrap();
        let second = db
            .ledger()
            .create_sale(sale_input(
                CustomerRef::Existing {
                    id: customer.id.clone(),
                },
                vec![line(&tea.id, 2, 10_000, 0)],
                0,
            ))
            .await
            .unwrap();
        db.ledger()
            .record_sale_payment(payment_input(&first.sale.id, &customer.id, 20_000))
            .await
            .unwrap();
        db.ledger()
            .record_sale_payment(payment_input(&second.sale.id, &customer.id, 5_000))
            .await
            .unwrap();

        // Recompute the denormalized totals from the underlying rows
        let customer = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        let sales = db.sales().list_for_customer(&customer.id, 100).await.unwrap();

        let total_sales: i64 = sales.iter().map(|s| s.sub_total_cents).sum();
        let mut ledger_paid = 0;
        for sale in &sales {
            ledger_paid += db.sales().ledger_total_paid(&sale.id).await.unwrap();
            // Per-sale invariants hold too
            assert_eq!(sale.due_amount_cents, sale.sub_total_cents - sale.amount_paid_cents);
        }

        assert_eq!(customer.total_sales_cents, total_sales);
        assert_eq!(customer.amount_paid_cents, ledger_paid);
        assert_eq!(customer.balance_cents, total_sales - ledger_paid);
    }
}
