//! # Reconciliation
//!
//! Read-only drawer report for a closed shift.
//!
//! ```text
//! expected_end_cash = start_cash_amount + total_sales
//! variance          = end_cash_amount - expected_end_cash
//!
//! variance == 0  → Balanced
//! variance  > 0  → Over   (more cash than expected)
//! variance  < 0  → Short  (cash missing)
//! ```
//!
//! Reports are never stored; they are recomputed from the shift whenever asked.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Shift, ShiftStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    Balanced,
    Over,
    Short,
}

impl ReconciliationOutcome {
    fn from_variance(variance: Money) -> Self {
        if variance.is_zero() {
            ReconciliationOutcome::Balanced
        } else if variance.is_positive() {
            ReconciliationOutcome::Over
        } else {
            ReconciliationOutcome::Short
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub shift_id: String,
    pub start_cash_amount: Money,
    pub total_sales: Money,
    #[ts(type = "number")]
    pub total_orders: i64,
    pub expected_end_cash: Money,
    pub end_cash_amount: Money,
    pub variance: Money,
    pub outcome: ReconciliationOutcome,
}

impl ReconciliationReport {
    /// Reconciles a closed shift.
    ///
    /// ## Errors
    /// - `ShiftNotClosed` if the shift is still active or has no counted cash
    /// - `AmountOverflow` if the totals cannot be represented
    pub fn for_shift(shift: &Shift) -> CoreResult<Self> {
        let end_cash_amount = match (shift.status, shift.end_cash_amount) {
            (ShiftStatus::Closed, Some(end)) => end,
            _ => {
                return Err(CoreError::ShiftNotClosed {
                    shift_id: shift.id.clone(),
                })
            }
        };

        let expected_end_cash = shift.expected_cash()?;
        let variance = end_cash_amount
            .cents()
            .checked_sub(expected_end_cash.cents())
            .map(Money::from_cents)
            .ok_or(CoreError::AmountOverflow)?;

        Ok(ReconciliationReport {
            shift_id: shift.id.clone(),
            start_cash_amount: shift.start_cash_amount,
            total_sales: shift.total_sales,
            total_orders: shift.total_orders,
            expected_end_cash,
            end_cash_amount,
            variance,
            outcome: ReconciliationOutcome::from_variance(variance),
        })
    }
}

/// Cash the operator should find in the drawer if they closed now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedEndCash {
    pub shift_id: String,
    pub suggested_end_cash: Money,
}

impl SuggestedEndCash {
    pub fn for_shift(shift: &Shift) -> CoreResult<Self> {
        Ok(SuggestedEndCash {
            shift_id: shift.id.clone(),
            suggested_end_cash: shift.expected_cash()?,
        })
    }
}
