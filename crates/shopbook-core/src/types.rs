//! # Domain Types
//!
//! Core domain types used throughout Shopbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  quantity       │   │  invoice_number │   │  vendor_id      │       │
//! │  │  cost/price     │   │  status         │   │  total/paid     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │ PaymentHistory  │   │     Vendor      │       │
//! │  │  balance (dues) │   │  append-only    │   │  balance (dues) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (invoice_number) - human-readable
//!
//! ## Running Totals vs the Ledger
//! `Customer.balance_cents` and `Vendor.balance_cents` are denormalized
//! running totals. The append-only `PaymentHistory` and
//! `VendorPaymentHistory` tables are the ledger those totals must always
//! agree with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::derive_status;

// =============================================================================
// Sale Status
// =============================================================================

/// Payment status of a sale (stored) or purchase (derived on read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Nothing paid yet.
    Pending,
    /// Some amount paid, dues remain.
    PartiallyPaid,
    /// Fully settled.
    Completed,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Direct bank transfer.
    BankTransfer,
    /// Online payment (wallet, gateway).
    Online,
}

// =============================================================================
// Dues Status
// =============================================================================

/// Whether a vendor payment fully covers the totals it is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DuesStatus {
    /// Payment covered the linked total in full.
    Cleared,
    /// Dues remain against the linked total.
    Pending,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
///
/// Stock moves in two directions only: purchases increment `quantity`,
/// sales decrement it. A committed sale must never drive it negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category label (e.g. "Beverages").
    pub category: String,

    /// Unit of measure (e.g. "pcs", "kg").
    pub unit: String,

    /// Integer stock on hand.
    pub quantity: i64,

    /// Stock level at or below which the product is flagged as low.
    pub low_stock_threshold: i64,

    /// Acquisition cost per unit, in cents.
    pub cost_cents: i64,

    /// Selling price per unit, in cents.
    pub price_cents: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether stock covers the requested quantity.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// Checks whether the product sits at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

// =============================================================================
// Vendor
// =============================================================================

/// A supplier the business purchases stock from.
///
/// Invariant: `balance_cents == total_purchases_cents - amount_paid_cents`
/// at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub phone_number: Option<String>,
    /// Lifetime purchase volume, in cents.
    pub total_purchases_cents: i64,
    /// Lifetime amount paid to this vendor, in cents.
    pub amount_paid_cents: i64,
    /// Outstanding amount owed to this vendor, in cents.
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer the business sells to, possibly on credit.
///
/// `balance_cents` is the sum of unpaid/partially-paid sale dues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    /// Outstanding dues, in cents.
    pub balance_cents: i64,
    /// Lifetime sales volume, in cents.
    pub total_sales_cents: i64,
    /// Lifetime amount paid by this customer, in cents.
    pub amount_paid_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the outstanding dues as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction.
///
/// Invariants: `sub_total_cents == Σ items.total_cents` and
/// `due_amount_cents == sub_total_cents - amount_paid_cents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Human-facing invoice number, unique across all sales.
    pub invoice_number: String,
    pub customer_id: String,
    /// Business date of the sale (distinct from created_at).
    pub date: DateTime<Utc>,
    pub sub_total_cents: i64,
    pub amount_paid_cents: i64,
    pub due_amount_cents: i64,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sub total as Money.
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }

    /// Returns the amount paid as Money.
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Returns the remaining due as Money.
    #[inline]
    pub fn due_amount(&self) -> Money {
        Money::from_cents(self.due_amount_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// `total_cents` freezes `quantity * unit_price - discount` at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A stock purchase from a vendor.
///
/// Purchases carry no stored status; it is always derived from the amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub vendor_id: String,
    /// Business date of the purchase.
    pub date: DateTime<Utc>,
    pub total_amount_cents: i64,
    pub amount_paid_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the unpaid remainder as Money.
    #[inline]
    pub fn due(&self) -> Money {
        Money::from_cents(self.total_amount_cents - self.amount_paid_cents)
    }

    /// Derives the payment status from the amounts. Never stored.
    #[inline]
    pub fn status(&self) -> SaleStatus {
        derive_status(
            Money::from_cents(self.total_amount_cents),
            Money::from_cents(self.amount_paid_cents),
        )
    }
}

// =============================================================================
// Purchase Item
// =============================================================================

/// A line item in a purchase.
///
/// `sell_rate_cents` records the selling price set at restock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Cost per unit, in cents.
    pub rate_cents: i64,
    /// Selling price per unit set at restock time, in cents.
    pub sell_rate_cents: i64,
    /// quantity * rate, in cents.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment History (customer side)
// =============================================================================

/// Append-only record of a payment against a sale.
///
/// Rows are written when a sale is created with a non-zero initial payment
/// and whenever a later payment is recorded. They are never mutated or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentHistory {
    pub id: String,
    pub sale_id: String,
    pub date: DateTime<Utc>,
    pub amount_paid_cents: i64,
    /// Due on the sale immediately before this payment.
    pub due_before_cents: i64,
    /// Due on the sale immediately after this payment.
    pub balance_after_cents: i64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Vendor Payment History
// =============================================================================

/// Append-only record of a payment made to a vendor.
///
/// Optionally tagged to a purchase and linked to the purchase items the
/// payment was applied against (via `vendor_payment_links`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VendorPaymentHistory {
    pub id: String,
    pub vendor_id: String,
    pub purchase_id: Option<String>,
    pub date: DateTime<Utc>,
    /// Total this payment was recorded against, in cents.
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub dues_status: DuesStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Operation Inputs
// =============================================================================

/// How a sale identifies its customer.
///
/// The entry form lets the operator either pick an existing customer or
/// type a name and phone; the latter finds a matching customer or creates
/// one inside the sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CustomerRef {
    /// Reference an existing customer by id.
    Existing { id: String },
    /// Find a customer by exact name and phone, or create one.
    NewByNameAndPhone { name: String, phone_number: String },
}

/// One line of a sale being entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Flat discount on the line. Defaults to 0 when absent.
    #[serde(default)]
    pub discount_cents: i64,
}

impl SaleLineInput {
    /// Line total: `quantity * unit_price - discount`.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.quantity * self.unit_price_cents - self.discount_cents)
    }
}

/// Input for creating a sale with its items and optional initial payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleInput {
    pub customer: CustomerRef,
    pub date: DateTime<Utc>,
    pub items: Vec<SaleLineInput>,
    /// Amount paid up front. Zero means fully on credit.
    #[serde(default)]
    pub amount_paid_cents: i64,
    pub payment_method: PaymentMethod,
}

impl CreateSaleInput {
    /// Sub total across all lines.
    #[inline]
    pub fn sub_total(&self) -> Money {
        self.items.iter().map(SaleLineInput::total).sum()
    }
}

/// Input for recording a payment against an existing sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSalePaymentInput {
    pub sale_id: String,
    /// Owning customer, as a consistency check against the sale row.
    pub customer_id: String,
    pub amount_paid_cents: i64,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

/// Input for creating a single-item purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseInput {
    pub vendor_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Cost per unit, in cents.
    pub rate_cents: i64,
    /// Selling price per unit to set on the product, in cents.
    pub sell_rate_cents: i64,
    /// Must equal `quantity * rate_cents` exactly.
    pub total_amount_cents: i64,
    #[serde(default)]
    pub amount_paid_cents: i64,
    pub date: DateTime<Utc>,
}

/// Input for recording a payment to a vendor, optionally applied against
/// specific purchases in the order given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordVendorPaymentInput {
    pub vendor_id: String,
    pub date: DateTime<Utc>,
    pub amount_paid_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Purchases to apply the payment against, strictly in this order.
    #[serde(default)]
    pub purchase_ids: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
