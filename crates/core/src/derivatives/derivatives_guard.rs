//! Absolute-state guard.
//!
//! A derivative becomes absolute once its trade date lies strictly before the
//! reference date. Absolute derivatives can no longer be updated or deleted.
//! The state is never stored: it must be evaluated at the time of each operation.

use chrono::NaiveDate;

use super::derivatives_model::Derivative;

/// Returns true iff `derivative.date_of_trade` is strictly earlier than `reference_date`.
pub fn is_absolute(derivative: &Derivative, reference_date: NaiveDate) -> bool {
    derivative.date_of_trade < reference_date
}
