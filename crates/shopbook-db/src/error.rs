//! # Database Error Types
//!
//! Error types for database operations and the combined error surface the
//! ledger operations expose to callers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerOpError ← DbError ∪ LedgerError, carries an ErrorCode           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation layer maps ErrorCode to an HTTP status / UI message      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use shopbook_core::{LedgerError, ValidationError};

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate invoice number (retried once by the sale flow)
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when this is a UNIQUE violation on the given column path
    /// (e.g. "sales.invoice_number").
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// LedgerOpError
// =============================================================================

/// Error surface of the atomic ledger operations: either a business rule
/// violation or a database failure.
#[derive(Debug, Error)]
pub enum LedgerOpError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for LedgerOpError {
    fn from(err: ValidationError) -> Self {
        LedgerOpError::Ledger(LedgerError::Validation(err))
    }
}

impl From<sqlx::Error> for LedgerOpError {
    fn from(err: sqlx::Error) -> Self {
        LedgerOpError::Db(DbError::from(err))
    }
}

impl LedgerOpError {
    /// Machine-readable code for the presentation boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerOpError::Ledger(err) => match err {
                LedgerError::Validation(_) => ErrorCode::ValidationError,
                LedgerError::ProductNotFound(_)
                | LedgerError::CustomerNotFound(_)
                | LedgerError::VendorNotFound(_)
                | LedgerError::SaleNotFound(_)
                | LedgerError::PurchaseNotFound(_) => ErrorCode::NotFound,
                LedgerError::HasPaymentHistory(_) | LedgerError::HasPurchases(_) => {
                    ErrorCode::Conflict
                }
                LedgerError::InsufficientStock { .. }
                | LedgerError::TotalMismatch { .. }
                | LedgerError::PaymentExceedsBalance { .. }
                | LedgerError::PaymentExceedsSelectedDues { .. }
                | LedgerError::CustomerMismatch { .. }
                | LedgerError::InvalidPurchaseReference { .. } => ErrorCode::BusinessRule,
            },
            LedgerOpError::Db(err) => match err {
                DbError::NotFound { .. } => ErrorCode::NotFound,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                    ErrorCode::ValidationError
                }
                _ => ErrorCode::DatabaseError,
            },
        }
    }
}

/// Result type for ledger operations.
pub type LedgerOpResult<T> = Result<T, LedgerOpError>;

// =============================================================================
// ErrorCode
// =============================================================================

/// Error codes for the presentation boundary.
///
/// Each code maps to an HTTP-equivalent status so an eventual API layer can
/// translate mechanically; detail stays in the error message, stack-level
/// detail stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400).
    ValidationError,

    /// Resource not found (404).
    NotFound,

    /// Destructive operation blocked by dependent records (409).
    Conflict,

    /// Business rule violated inside the transaction (422).
    BusinessRule,

    /// Database operation failed (500).
    DatabaseError,
}

impl ErrorCode {
    /// HTTP-equivalent status code.
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::BusinessRule => 422,
            ErrorCode::DatabaseError => 500,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LedgerOpError::Ledger(LedgerError::SaleNotFound("x".to_string()));
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.code().http_status(), 404);

        let err = LedgerOpError::Ledger(LedgerError::HasPaymentHistory("x".to_string()));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.code().http_status(), 409);

        let err = LedgerOpError::Ledger(LedgerError::PaymentExceedsBalance {
            amount: 200,
            balance: 140,
        });
        assert_eq!(err.code(), ErrorCode::BusinessRule);

        let err = LedgerOpError::Db(DbError::PoolExhausted);
        assert_eq!(err.code().http_status(), 500);
    }

    #[test]
    fn test_unique_violation_matcher() {
        let err = DbError::UniqueViolation {
            field: "sales.invoice_number".to_string(),
            value: "unknown".to_string(),
        };
        assert!(err.is_unique_violation_on("invoice_number"));
        assert!(!err.is_unique_violation_on("phone_number"));
    }
}
