//! # Shift Ledger
//!
//! The single-active-shift state machine of one register.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌────────────────┐   open_shift    ┌────────────────────────────┐    │
//! │   │ NoActiveShift  │────────────────►│ Active(shift, applied ids) │    │
//! │   │                │◄────────────────│                            │    │
//! │   └────────────────┘   close_shift   └─────────────┬──────────────┘    │
//! │           │              │                         │                   │
//! │           │              ▼                         │ record_completed_ │
//! │           │        closed_ids barrier              │ order (once per   │
//! │           │   (late orders → ShiftMismatch)        ▼ order id)         │
//! │           │                                  totals += total            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Every operation validates first and mutates last. A failing call leaves the
//! ledger exactly as it was, so callers may apply a command to a clone, persist,
//! and then swap the clone in.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::reconciliation::ReconciliationReport;
use crate::types::{Shift, ShiftStatus};
use crate::validation::{validate_notes, validate_operator_id};

// =============================================================================
// Commands
// =============================================================================

/// Input for [`ShiftLedger::open_shift`].
#[derive(Debug, Clone)]
pub struct OpenShift {
    pub start_cash_amount: Money,
    pub operator_id: String,
    pub notes: Option<String>,
}

/// Input for [`ShiftLedger::close_shift`].
#[derive(Debug, Clone)]
pub struct CloseShift {
    pub end_cash_amount: Money,
    pub operator_id: String,
    pub notes: Option<String>,
    /// Shift the operator believes is open; `None` closes whatever is active.
    pub expected_shift_id: Option<String>,
}

/// Result of [`ShiftLedger::record_completed_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Totals were updated.
    Applied,
    /// The order id was already counted; nothing changed.
    Duplicate,
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone)]
struct ActiveShift {
    shift: Shift,
    applied: HashSet<String>,
}

/// Owns the current shift of one register.
#[derive(Debug, Clone, Default)]
pub struct ShiftLedger {
    active: Option<ActiveShift>,
    closed_ids: HashSet<String>,
}

impl ShiftLedger {
    /// Empty ledger: no active shift, no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted state.
    ///
    /// `applied_order_ids` are the completed orders already counted in the
    /// active shift's totals.
    pub fn restore(
        active: Option<Shift>,
        applied_order_ids: impl IntoIterator<Item = String>,
        closed_shift_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        let active = active
            .filter(Shift::is_active)
            .map(|shift| ActiveShift {
                shift,
                applied: applied_order_ids.into_iter().collect(),
            });

        ShiftLedger {
            active,
            closed_ids: closed_shift_ids.into_iter().collect(),
        }
    }

    /// The active shift, if any.
    pub fn current_shift(&self) -> Option<&Shift> {
        self.active.as_ref().map(|a| &a.shift)
    }

    /// Whether `order_id` has already been counted in the active shift.
    pub fn is_applied(&self, order_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.applied.contains(order_id))
    }

    /// Whether `shift_id` was closed by this ledger or restored as closed.
    pub fn is_closed(&self, shift_id: &str) -> bool {
        self.closed_ids.contains(shift_id)
    }

    /// Checks that `shift_id` is the active shift, without changing anything.
    ///
    /// Used before an order is priced so a stale console fails fast.
    pub fn ensure_accepts(&self, shift_id: &str) -> CoreResult<&Shift> {
        if self.closed_ids.contains(shift_id) {
            return Err(self.mismatch(shift_id));
        }
        let active = self.active.as_ref().ok_or(CoreError::NoActiveShift)?;
        if active.shift.id != shift_id {
            return Err(self.mismatch(shift_id));
        }
        Ok(&active.shift)
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Opens a new shift with zeroed aggregates.
    ///
    /// ## Errors
    /// - `ShiftAlreadyActive` if a shift is open
    /// - `InvalidAmount` for a negative opening float
    /// - `Validation` for a blank operator or oversized notes
    pub fn open_shift(
        &mut self,
        cmd: OpenShift,
        id: String,
        at: DateTime<Utc>,
    ) -> CoreResult<Shift> {
        if let Some(active) = &self.active {
            return Err(CoreError::ShiftAlreadyActive {
                shift_id: active.shift.id.clone(),
            });
        }

        let start_cash_amount =
            Money::non_negative("startCashAmount", cmd.start_cash_amount.cents())?;
        validate_operator_id(&cmd.operator_id)?;
        let notes = validate_notes(cmd.notes.as_deref())?;

        let shift = Shift {
            id,
            start_time: at,
            end_time: None,
            opening_user_id: cmd.operator_id.trim().to_string(),
            closing_user_id: None,
            start_cash_amount,
            end_cash_amount: None,
            status: ShiftStatus::Active,
            total_orders: 0,
            total_sales: Money::zero(),
            notes,
        };

        self.active = Some(ActiveShift {
            shift: shift.clone(),
            applied: HashSet::new(),
        });
        Ok(shift)
    }

    /// Counts a completed order against the active shift, once.
    ///
    /// ## Check Order
    /// ```text
    /// order id already applied ........ Duplicate (no-op)
    /// shift id was closed ............. ShiftMismatch
    /// no active shift ................. NoActiveShift
    /// shift id is not the active one .. ShiftMismatch
    /// negative total .................. InvalidAmount
    /// otherwise ....................... totals += (1, total)
    /// ```
    pub fn record_completed_order(
        &mut self,
        shift_id: &str,
        order_id: &str,
        total: Money,
    ) -> CoreResult<RecordOutcome> {
        if self.is_applied(order_id) {
            return Ok(RecordOutcome::Duplicate);
        }

        self.ensure_accepts(shift_id)?;

        if total.is_negative() {
            return Err(CoreError::InvalidAmount {
                field: "orderTotal".to_string(),
                cents: total.cents(),
            });
        }

        let active = self.active.as_mut().ok_or(CoreError::NoActiveShift)?;
        let total_sales = active.shift.total_sales.checked_add(total)?;
        let total_orders = active
            .shift
            .total_orders
            .checked_add(1)
            .ok_or(CoreError::AmountOverflow)?;

        active.shift.total_sales = total_sales;
        active.shift.total_orders = total_orders;
        active.applied.insert(order_id.to_string());
        Ok(RecordOutcome::Applied)
    }

    /// Closes the active shift and reconciles the drawer.
    ///
    /// ## Errors
    /// - `InvalidAmount` for negative counted cash
    /// - `NoActiveShift` if nothing is open
    /// - `ShiftMismatch` if `expected_shift_id` names another shift
    /// - `Validation` for a blank operator or oversized notes
    pub fn close_shift(
        &mut self,
        cmd: CloseShift,
        at: DateTime<Utc>,
    ) -> CoreResult<(Shift, ReconciliationReport)> {
        let end_cash_amount = Money::non_negative("endCashAmount", cmd.end_cash_amount.cents())?;
        validate_operator_id(&cmd.operator_id)?;
        let closing_notes = validate_notes(cmd.notes.as_deref())?;

        let active = self.active.as_ref().ok_or(CoreError::NoActiveShift)?;
        if let Some(expected) = &cmd.expected_shift_id {
            if *expected != active.shift.id {
                return Err(self.mismatch(expected));
            }
        }

        let mut shift = active.shift.clone();
        shift.status = ShiftStatus::Closed;
        shift.end_time = Some(at);
        shift.closing_user_id = Some(cmd.operator_id.trim().to_string());
        shift.end_cash_amount = Some(end_cash_amount);
        if closing_notes.is_some() {
            shift.notes = closing_notes;
        }

        let report = ReconciliationReport::for_shift(&shift)?;

        self.closed_ids.insert(shift.id.clone());
        self.active = None;
        Ok((shift, report))
    }

    fn mismatch(&self, actual: &str) -> CoreError {
        CoreError::ShiftMismatch {
            expected: self.active.as_ref().map(|a| a.shift.id.clone()),
            actual: actual.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::ReconciliationOutcome;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, hour, 0, 0).unwrap()
    }

    fn open(ledger: &mut ShiftLedger, id: &str, cash: i64) -> CoreResult<Shift> {
        ledger.open_shift(
            OpenShift {
                start_cash_amount: Money::from_cents(cash),
                operator_id: "alice".to_string(),
                notes: Some("morning".to_string()),
            },
            id.to_string(),
            at(8),
        )
    }

    fn close(end_cash: i64, expected: Option<&str>) -> CloseShift {
        CloseShift {
            end_cash_amount: Money::from_cents(end_cash),
            operator_id: "bob".to_string(),
            notes: None,
            expected_shift_id: expected.map(str::to_string),
        }
    }

    #[test]
    fn test_open_shift() {
        let mut ledger = ShiftLedger::new();
        let shift = open(&mut ledger, "s1", 1000).unwrap();
        assert_eq!(shift.status, ShiftStatus::Active);
        assert_eq!(shift.total_orders, 0);
        assert_eq!(shift.total_sales, Money::zero());
        assert_eq!(ledger.current_shift().map(|s| s.id.as_str()), Some("s1"));
    }

    #[test]
    fn test_open_twice_fails() {
        let mut ledger = ShiftLedger::new();
        open(&mut ledger, "s1", 1000).unwrap();
        let err = open(&mut ledger, "s2", 500).unwrap_err();
        assert!(matches!(err, CoreError::ShiftAlreadyActive { ref shift_id } if shift_id == "s1"));
        assert_eq!(ledger.current_shift().unwrap().id, "s1");
    }

    #[test]
    fn test_open_validation() {
        let mut ledger = ShiftLedger::new();
        assert!(matches!(
            open(&mut ledger, "s1", -1),
            Err(CoreError::InvalidAmount { .. })
        ));

        let err = ledger
            .open_shift(
                OpenShift {
                    start_cash_amount: Money::zero(),
                    operator_id: "  ".to_string(),
                    notes: None,
                },
                "s1".to_string(),
                at(8),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(ledger.current_shift().is_none());
    }

    #[test]
    fn test_record_and_duplicate() {
        let mut ledger = ShiftLedger::new();
        open(&mut ledger, "s1", 1000).unwrap();

        assert_eq!(
            ledger.record_completed_order("s1", "o1", Money::from_cents(300)).unwrap(),
            RecordOutcome::Applied
        );
        assert_eq!(
            ledger.record_completed_order("s1", "o1", Money::from_cents(300)).unwrap(),
            RecordOutcome::Duplicate
        );
        ledger.record_completed_order("s1", "o2", Money::from_cents(450)).unwrap();

        let shift = ledger.current_shift().unwrap();
        assert_eq!(shift.total_orders, 2);
        assert_eq!(shift.total_sales.cents(), 750);
    }

    #[test]
    fn test_record_rejections() {
        let mut ledger = ShiftLedger::new();
        assert!(matches!(
            ledger.record_completed_order("s1", "o1", Money::from_cents(10)),
            Err(CoreError::NoActiveShift)
        ));

        open(&mut ledger, "s1", 0).unwrap();
        assert!(matches!(
            ledger.record_completed_order("other", "o1", Money::from_cents(10)),
            Err(CoreError::ShiftMismatch { .. })
        ));
        assert!(matches!(
            ledger.record_completed_order("s1", "o1", Money::from_cents(-10)),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert_eq!(ledger.current_shift().unwrap().total_orders, 0);
    }

    #[test]
    fn test_late_order_after_close_is_mismatch() {
        let mut ledger = ShiftLedger::new();
        open(&mut ledger, "s1", 1000).unwrap();
        ledger.record_completed_order("s1", "o1", Money::from_cents(300)).unwrap();
        let (closed, _) = ledger.close_shift(close(1300, None), at(17)).unwrap();

        let err = ledger
            .record_completed_order("s1", "o2", Money::from_cents(100))
            .unwrap_err();
        assert!(matches!(err, CoreError::ShiftMismatch { expected: None, .. }));
        assert_eq!(closed.total_sales.cents(), 300);

        open(&mut ledger, "s2", 1300).unwrap();
        assert!(matches!(
            ledger.record_completed_order("s1", "o3", Money::from_cents(100)),
            Err(CoreError::ShiftMismatch { expected: Some(_), .. })
        ));
    }

    #[test]
    fn test_close_shift_reconciles() {
        let mut ledger = ShiftLedger::new();
        open(&mut ledger, "s1", 1000).unwrap();
        ledger.record_completed_order("s1", "o1", Money::from_cents(300)).unwrap();
        ledger.record_completed_order("s1", "o2", Money::from_cents(450)).unwrap();

        let (shift, report) = ledger.close_shift(close(1750, Some("s1")), at(17)).unwrap();
        assert_eq!(shift.status, ShiftStatus::Closed);
        assert_eq!(shift.end_time, Some(at(17)));
        assert_eq!(shift.closing_user_id.as_deref(), Some("bob"));
        assert_eq!(shift.notes.as_deref(), Some("morning"));
        assert_eq!(report.expected_end_cash.cents(), 1750);
        assert_eq!(report.variance.cents(), 0);
        assert_eq!(report.outcome, ReconciliationOutcome::Balanced);
        assert!(ledger.current_shift().is_none());
        assert!(ledger.is_closed("s1"));
    }

    #[test]
    fn test_closing_notes_replace_opening_notes() {
        let mut ledger = ShiftLedger::new();
        open(&mut ledger, "s1", 0).unwrap();
        let mut cmd = close(0, None);
        cmd.notes = Some("drawer jammed".to_string());
        let (shift, _) = ledger.close_shift(cmd, at(17)).unwrap();
        assert_eq!(shift.notes.as_deref(), Some("drawer jammed"));
    }

    #[test]
    fn test_close_failures_leave_ledger_untouched() {
        let mut ledger = ShiftLedger::new();
        assert!(matches!(
            ledger.close_shift(close(0, None), at(17)),
            Err(CoreError::NoActiveShift)
        ));

        open(&mut ledger, "s1", 1000).unwrap();
        assert!(matches!(
            ledger.close_shift(close(-5, None), at(17)),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.close_shift(close(1000, Some("s9")), at(17)),
            Err(CoreError::ShiftMismatch { .. })
        ));
        assert_eq!(ledger.current_shift().unwrap().status, ShiftStatus::Active);
        assert!(!ledger.is_closed("s1"));
    }

    #[test]
    fn test_restore() {
        let mut ledger = ShiftLedger::new();
        let mut shift = open(&mut ledger, "s2", 500).unwrap();
        shift.total_orders = 1;
        shift.total_sales = Money::from_cents(120);

        let mut restored =
            ShiftLedger::restore(Some(shift), vec!["o1".to_string()], vec!["s1".to_string()]);
        assert_eq!(
            restored.record_completed_order("s2", "o1", Money::from_cents(120)).unwrap(),
            RecordOutcome::Duplicate
        );
        assert!(matches!(
            restored.record_completed_order("s1", "o9", Money::from_cents(1)),
            Err(CoreError::ShiftMismatch { .. })
        ));
        assert_eq!(restored.current_shift().unwrap().total_sales.cents(), 120);
    }
}
