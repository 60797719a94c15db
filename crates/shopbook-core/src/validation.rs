//! # Validation Module
//!
//! Fail-fast input validation for the ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure, before any I/O)                           │
//! │  ├── Required fields, formats, ranges                                  │
//! │  └── A failure here guarantees ZERO side effects                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger transaction (shopbook-db)                             │
//! │  ├── Existence checks on re-read rows                                  │
//! │  └── Business-rule checks (stock, dues, ownership)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / CHECK constraints                             │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches a different class of error       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{
    CreatePurchaseInput, CreateSaleInput, CustomerRef, RecordSalePaymentInput,
    RecordVendorPaymentInput, SaleLineInput,
};
use crate::{MAX_LINE_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an entity id.
///
/// ## Rules
/// - Must not be empty
/// - Must be a valid UUID
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a display name (customer, vendor, product).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a phone number used for customer find-or-create matching.
///
/// Matching is by exact string, so the only hard rules are presence and a
/// sane length. Formatting is left to the entry form.
pub fn validate_phone_number(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone_number".to_string(),
        });
    }

    if phone.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "phone_number".to_string(),
            max: 30,
        });
    }

    Ok(())
}

/// Validates a line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price or rate in cents. Must be strictly positive.
pub fn validate_unit_price(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an upfront paid amount in cents. Zero is allowed (on credit).
pub fn validate_paid_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amount_paid".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a standalone payment amount in cents. Must be positive.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount_paid".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Operation Input Validators
// =============================================================================

/// Validates one sale line.
///
/// The discount may not exceed the gross line amount; a negative line total
/// would let a sale reduce a customer's dues.
pub fn validate_sale_line(line: &SaleLineInput) -> ValidationResult<()> {
    validate_id("product_id", &line.product_id)?;
    validate_quantity(line.quantity)?;
    validate_unit_price("unit_price", line.unit_price_cents)?;

    if line.discount_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    let gross = line.quantity * line.unit_price_cents;
    if line.discount_cents > gross {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: gross,
        });
    }

    Ok(())
}

/// Validates a sale creation input before any I/O happens.
pub fn validate_create_sale(input: &CreateSaleInput) -> ValidationResult<()> {
    match &input.customer {
        CustomerRef::Existing { id } => validate_id("customer_id", id)?,
        CustomerRef::NewByNameAndPhone { name, phone_number } => {
            validate_name("customer_name", name)?;
            validate_phone_number(phone_number)?;
        }
    }

    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if input.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for line in &input.items {
        validate_sale_line(line)?;
    }

    validate_paid_amount(input.amount_paid_cents)?;

    Ok(())
}

/// Validates a sale payment input before any I/O happens.
pub fn validate_record_sale_payment(input: &RecordSalePaymentInput) -> ValidationResult<()> {
    validate_id("sale_id", &input.sale_id)?;
    validate_id("customer_id", &input.customer_id)?;
    validate_payment_amount(input.amount_paid_cents)?;

    Ok(())
}

/// Validates a purchase creation input before any I/O happens.
///
/// Note: the `total == quantity * rate` consistency check is a business
/// rule, not a field check; it lives with the ledger operation.
pub fn validate_create_purchase(input: &CreatePurchaseInput) -> ValidationResult<()> {
    validate_id("vendor_id", &input.vendor_id)?;
    validate_id("product_id", &input.product_id)?;
    validate_quantity(input.quantity)?;
    validate_unit_price("rate", input.rate_cents)?;
    validate_unit_price("sell_rate", input.sell_rate_cents)?;
    validate_unit_price("total_amount", input.total_amount_cents)?;
    validate_paid_amount(input.amount_paid_cents)?;

    Ok(())
}

/// Validates a vendor payment input before any I/O happens.
pub fn validate_record_vendor_payment(input: &RecordVendorPaymentInput) -> ValidationResult<()> {
    validate_id("vendor_id", &input.vendor_id)?;
    validate_payment_amount(input.amount_paid_cents)?;

    for purchase_id in &input.purchase_ids {
        validate_id("purchase_id", purchase_id)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::Utc;

    const UUID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const UUID_B: &str = "550e8400-e29b-41d4-a716-446655440001";

    fn line(quantity: i64, unit_price_cents: i64, discount_cents: i64) -> SaleLineInput {
        SaleLineInput {
            product_id: UUID_A.to_string(),
            quantity,
            unit_price_cents,
            discount_cents,
        }
    }

    fn sale_input(items: Vec<SaleLineInput>, paid: i64) -> CreateSaleInput {
        CreateSaleInput {
            customer: CustomerRef::Existing {
                id: UUID_B.to_string(),
            },
            date: Utc::now(),
            items,
            amount_paid_cents: paid,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", UUID_A).is_ok());
        assert!(validate_id("id", "").is_err());
        assert!(validate_id("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Corner Shop").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_sale_line_discount_bounds() {
        assert!(validate_sale_line(&line(3, 100, 0)).is_ok());
        assert!(validate_sale_line(&line(3, 100, 300)).is_ok());
        // Discount larger than the gross line amount
        assert!(validate_sale_line(&line(3, 100, 301)).is_err());
        assert!(validate_sale_line(&line(3, 100, -1)).is_err());
    }

    #[test]
    fn test_validate_create_sale() {
        assert!(validate_create_sale(&sale_input(vec![line(1, 100, 0)], 0)).is_ok());

        // Items required
        assert!(validate_create_sale(&sale_input(vec![], 0)).is_err());

        // Paid must be non-negative, zero is fine
        assert!(validate_create_sale(&sale_input(vec![line(1, 100, 0)], -1)).is_err());
        assert!(validate_create_sale(&sale_input(vec![line(1, 100, 0)], 0)).is_ok());

        // New customer needs a name and phone
        let mut input = sale_input(vec![line(1, 100, 0)], 0);
        input.customer = CustomerRef::NewByNameAndPhone {
            name: "".to_string(),
            phone_number: "0300-1234567".to_string(),
        };
        assert!(validate_create_sale(&input).is_err());
    }

    #[test]
    fn test_validate_record_sale_payment() {
        let input = RecordSalePaymentInput {
            sale_id: UUID_A.to_string(),
            customer_id: UUID_B.to_string(),
            amount_paid_cents: 14_000,
            date: Utc::now(),
            payment_method: PaymentMethod::Cash,
        };
        assert!(validate_record_sale_payment(&input).is_ok());

        let zero = RecordSalePaymentInput {
            amount_paid_cents: 0,
            ..input.clone()
        };
        assert!(validate_record_sale_payment(&zero).is_err());
    }

    #[test]
    fn test_validate_create_purchase() {
        let input = CreatePurchaseInput {
            vendor_id: UUID_A.to_string(),
            product_id: UUID_B.to_string(),
            quantity: 10,
            rate_cents: 5_000,
            sell_rate_cents: 7_000,
            total_amount_cents: 50_000,
            amount_paid_cents: 0,
            date: Utc::now(),
        };
        assert!(validate_create_purchase(&input).is_ok());

        let bad_rate = CreatePurchaseInput {
            rate_cents: 0,
            ..input.clone()
        };
        assert!(validate_create_purchase(&bad_rate).is_err());
    }

    #[test]
    fn test_validate_record_vendor_payment() {
        let input = RecordVendorPaymentInput {
            vendor_id: UUID_A.to_string(),
            date: Utc::now(),
            amount_paid_cents: 30_000,
            notes: None,
            purchase_ids: vec![UUID_B.to_string()],
        };
        assert!(validate_record_vendor_payment(&input).is_ok());

        let bad_ref = RecordVendorPaymentInput {
            purchase_ids: vec!["nope".to_string()],
            ..input.clone()
        };
        assert!(validate_record_vendor_payment(&bad_ref).is_err());
    }
}
