//! # Error Types
//!
//! Domain-specific error types for shopbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopbook-core errors (this file)                                      │
//! │  ├── LedgerError      - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopbook-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerOpError    - LedgerError ∪ DbError, what callers see        │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → LedgerOpError → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (names, ids, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Business rule violations raised by the ledger operations.
///
/// Everything here is detected inside the atomic transaction (or, for
/// `TotalMismatch`, immediately before it opens) and aborts the whole
/// operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Product referenced by a sale or purchase line does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer referenced by a sale or payment does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Vendor referenced by a purchase or payment does not exist.
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// Sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Purchase does not exist.
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),

    /// Stock on hand cannot cover a sale line.
    ///
    /// ## When This Occurs
    /// The stock check runs on rows re-read inside the transaction, so a
    /// concurrent sale that drained the shelf surfaces here, not as a
    /// negative quantity.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Purchase total does not equal quantity * rate.
    #[error("Total mismatch: expected {expected} (quantity * rate), got {actual}")]
    TotalMismatch { expected: i64, actual: i64 },

    /// Payment is larger than what is owed.
    #[error("Payment {amount} exceeds outstanding balance {balance}")]
    PaymentExceedsBalance { amount: i64, balance: i64 },

    /// Vendor payment is larger than the dues of the purchases it targets.
    #[error("Payment {amount} exceeds selected purchase dues {dues}")]
    PaymentExceedsSelectedDues { amount: i64, dues: i64 },

    /// Sale does not belong to the customer named in the payment.
    #[error("Sale {sale_id} does not belong to customer {customer_id}")]
    CustomerMismatch {
        sale_id: String,
        customer_id: String,
    },

    /// A purchase in a vendor payment does not belong to that vendor.
    #[error("Purchase {purchase_id} does not belong to vendor {vendor_id}")]
    InvalidPurchaseReference {
        purchase_id: String,
        vendor_id: String,
    },

    /// Sale has recorded payments and cannot be deleted.
    #[error("Sale {0} has payment history and cannot be deleted")]
    HasPaymentHistory(String),

    /// Vendor has recorded purchases and cannot be deleted.
    #[error("Vendor {0} has purchases and cannot be deleted")]
    HasPurchases(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before any mutation; a validation failure guarantees zero
/// side effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientStock {
            name: "Green Tea 500g".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Green Tea 500g: available 3, requested 5"
        );

        let err = LedgerError::TotalMismatch {
            expected: 50_000,
            actual: 60_000,
        };
        assert_eq!(
            err.to_string(),
            "Total mismatch: expected 50000 (quantity * rate), got 60000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let ledger_err: LedgerError = validation_err.into();
        assert!(matches!(ledger_err, LedgerError::Validation(_)));
    }
}
