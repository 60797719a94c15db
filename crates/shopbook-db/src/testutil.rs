//! Shared helpers for db-crate tests: an in-memory database plus seeded
//! entities and input builders with sensible defaults.

use chrono::Utc;

use crate::pool::{Database, DbConfig};
use crate::repository::generate_id;
use shopbook_core::{
    CreatePurchaseInput, CreateSaleInput, Customer, CustomerRef, PaymentMethod, Product,
    RecordVendorPaymentInput, SaleLineInput, Vendor,
};

/// Fresh in-memory database with migrations applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Inserts a product with the given stock and rates.
pub(crate) async fn seed_product(
    db: &Database,
    name: &str,
    quantity: i64,
    cost_cents: i64,
    price_cents: i64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        name: name.to_string(),
        category: "General".to_string(),
        unit: "pcs".to_string(),
        quantity,
        low_stock_threshold: 2,
        cost_cents,
        price_cents,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.expect("seed product");
    product
}

/// Inserts a customer with zeroed balances.
pub(crate) async fn seed_customer(db: &Database, name: &str, phone_number: &str) -> Customer {
    let now = Utc::now();
    let customer = Customer {
        id: generate_id(),
        name: name.to_string(),
        phone_number: phone_number.to_string(),
        balance_cents: 0,
        total_sales_cents: 0,
        amount_paid_cents: 0,
        created_at: now,
        updated_at: now,
    };
    db.customers().insert(&customer).await.expect("seed customer");
    customer
}

/// Inserts a vendor with zeroed balances.
pub(crate) async fn seed_vendor(db: &Database, name: &str) -> Vendor {
    let now = Utc::now();
    let vendor = Vendor {
        id: generate_id(),
        name: name.to_string(),
        phone_number: None,
        total_purchases_cents: 0,
        amount_paid_cents: 0,
        balance_cents: 0,
        created_at: now,
        updated_at: now,
    };
    db.vendors().insert(&vendor).await.expect("seed vendor");
    vendor
}

/// One sale line.
pub(crate) fn line(
    product_id: &str,
    quantity: i64,
    unit_price_cents: i64,
    discount_cents: i64,
) -> SaleLineInput {
    SaleLineInput {
        product_id: product_id.to_string(),
        quantity,
        unit_price_cents,
        discount_cents,
    }
}

/// Sale input paid in cash on today's date.
pub(crate) fn sale_input(
    customer: CustomerRef,
    items: Vec<SaleLineInput>,
    amount_paid_cents: i64,
) -> CreateSaleInput {
    CreateSaleInput {
        customer,
        date: Utc::now(),
        items,
        amount_paid_cents,
        payment_method: PaymentMethod::Cash,
    }
}

/// Purchase input with the total precomputed as quantity * rate.
pub(crate) fn purchase_input(
    vendor_id: &str,
    product_id: &str,
    quantity: i64,
    rate_cents: i64,
    sell_rate_cents: i64,
    amount_paid_cents: i64,
) -> CreatePurchaseInput {
    CreatePurchaseInput {
        vendor_id: vendor_id.to_string(),
        product_id: product_id.to_string(),
        quantity,
        rate_cents,
        sell_rate_cents,
        total_amount_cents: quantity * rate_cents,
        amount_paid_cents,
        date: Utc::now(),
    }
}

/// Vendor payment input against the given purchases (possibly none).
pub(crate) fn vendor_payment(
    vendor_id: &str,
    amount_paid_cents: i64,
    purchase_ids: Vec<String>,
) -> RecordVendorPaymentInput {
    RecordVendorPaymentInput {
        vendor_id: vendor_id.to_string(),
        date: Utc::now(),
        amount_paid_cents,
        notes: None,
        purchase_ids,
    }
}
