//! # Status Derivation
//!
//! The one place payment status is computed from amounts.
//!
//! Sales persist their status (set at creation and on every payment);
//! purchases never do and derive it on read. Both paths go through
//! [`derive_status`] so the rule cannot drift between the two.

use crate::money::Money;
use crate::types::SaleStatus;

/// Derives a payment status from a total and the amount paid so far.
///
/// ## Rule
/// - due (total - paid) <= 0  → `Completed`
/// - paid > 0                 → `PartiallyPaid`
/// - otherwise                → `Pending`
#[inline]
pub fn derive_status(total: Money, paid: Money) -> SaleStatus {
    if total <= paid {
        SaleStatus::Completed
    } else if paid.is_positive() {
        SaleStatus::PartiallyPaid
    } else {
        SaleStatus::Pending
    }
}

/// Derives the status a sale moves to after a payment is applied.
///
/// The open branch inspects `paid_before` (the amount paid BEFORE this
/// payment), not the post-payment amount. This mirrors the historical
/// behavior of the payment flow and is covered by tests; do not "fix" the
/// branch without revisiting those.
///
/// ## Rule
/// - balance_after <= 0 → `Completed`
/// - paid_before > 0    → `PartiallyPaid`
/// - otherwise          → `Pending`
#[inline]
pub fn status_after_payment(paid_before: Money, balance_after: Money) -> SaleStatus {
    if balance_after <= Money::zero() {
        SaleStatus::Completed
    } else if paid_before.is_positive() {
        SaleStatus::PartiallyPaid
    } else {
        SaleStatus::Pending
    }
}
