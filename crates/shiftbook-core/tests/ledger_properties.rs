//! Property-based tests for the shift ledger and order pricing.
//!
//! These check the accounting invariants over arbitrary order streams rather
//! than a handful of hand-picked cases.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use shiftbook_core::order::compute_total;
use shiftbook_core::{
    CloseShift, CoreError, LineItem, Money, OpenShift, OptionAdjustment, RecordOutcome,
    ReconciliationOutcome, ShiftLedger,
};

fn open_ledger(start_cash: i64) -> ShiftLedger {
    let mut ledger = ShiftLedger::new();
    ledger
        .open_shift(
            OpenShift {
                start_cash_amount: Money::from_cents(start_cash),
                operator_id: "prop".to_string(),
                notes: None,
            },
            "shift".to_string(),
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        )
        .unwrap();
    ledger
}

fn close_cmd(end_cash: i64) -> CloseShift {
    CloseShift {
        end_cash_amount: Money::from_cents(end_cash),
        operator_id: "prop".to_string(),
        notes: None,
        expected_shift_id: Some("shift".to_string()),
    }
}

// Strategies for generating test data
fn order_totals_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..100_000, 0..50)
}

fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (
        "[a-z]{1,8}",
        0i64..10_000,
        1i64..=999,
        prop::collection::vec(0i64..500, 0..3),
    )
        .prop_map(|(product, price, quantity, adjustments)| LineItem {
            product_id: product.clone(),
            name: product,
            unit_price: Money::from_cents(price),
            quantity,
            option_adjustments: adjustments
                .into_iter()
                .map(|a| OptionAdjustment {
                    label: "opt".to_string(),
                    amount: Money::from_cents(a),
                })
                .collect(),
            notes: None,
        })
}

// Property: Totals are exact sums of distinct orders
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn totals_equal_sum_of_distinct_orders(totals in order_totals_strategy()) {
        let mut ledger = open_ledger(0);
        for (i, total) in totals.iter().enumerate() {
            let outcome = ledger
                .record_completed_order("shift", &format!("order-{i}"), Money::from_cents(*total))
                .unwrap();
            prop_assert_eq!(outcome, RecordOutcome::Applied);
        }

        let shift = ledger.current_shift().unwrap();
        prop_assert_eq!(shift.total_sales.cents(), totals.iter().sum::<i64>());
        prop_assert_eq!(shift.total_orders, totals.len() as i64);
    }

    #[test]
    fn replaying_orders_changes_totals_once(totals in order_totals_strategy()) {
        let mut ledger = open_ledger(0);
        for round in 0..2 {
            for (i, total) in totals.iter().enumerate() {
                let outcome = ledger
                    .record_completed_order("shift", &format!("order-{i}"), Money::from_cents(*total))
                    .unwrap();
                let expected = if round == 0 { RecordOutcome::Applied } else { RecordOutcome::Duplicate };
                prop_assert_eq!(outcome, expected);
            }
        }

        let shift = ledger.current_shift().unwrap();
        prop_assert_eq!(shift.total_sales.cents(), totals.iter().sum::<i64>());
        prop_assert_eq!(shift.total_orders, totals.len() as i64);
    }
}

// Property: Reconciliation variance is counted minus expected
proptest! {
    #[test]
    fn variance_is_counted_minus_expected(
        start in 0i64..1_000_000,
        totals in order_totals_strategy(),
        end in 0i64..10_000_000,
    ) {
        let mut ledger = open_ledger(start);
        for (i, total) in totals.iter().enumerate() {
            ledger
                .record_completed_order("shift", &format!("order-{i}"), Money::from_cents(*total))
                .unwrap();
        }

        let (shift, report) = ledger.close_shift(close_cmd(end), Utc::now()).unwrap();
        let expected = start + totals.iter().sum::<i64>();

        prop_assert_eq!(report.expected_end_cash.cents(), expected);
        prop_assert_eq!(report.variance.cents(), end - expected);
        prop_assert_eq!(report.outcome == ReconciliationOutcome::Balanced, end == expected);

        // Closed shift rejects late orders and keeps its frozen totals
        let late = ledger.record_completed_order("shift", "late", Money::from_cents(1));
        let is_mismatch = matches!(late, Err(CoreError::ShiftMismatch { .. }));
        prop_assert!(is_mismatch);
        prop_assert_eq!(shift.total_sales.cents(), totals.iter().sum::<i64>());
    }
}

// Property: Order totals
proptest! {
    #[test]
    fn order_total_is_sum_of_line_totals(items in prop::collection::vec(line_item_strategy(), 1..10)) {
        let expected: i64 = items
            .iter()
            .map(|item| {
                let adjusted = item.unit_price.cents()
                    + item.option_adjustments.iter().map(|a| a.amount.cents()).sum::<i64>();
                adjusted * item.quantity
            })
            .sum();

        prop_assert_eq!(compute_total(&items).unwrap().cents(), expected);
    }

    #[test]
    fn out_of_range_quantities_are_rejected(qty in prop_oneof![-1000i64..1, 1000i64..100_000]) {
        let item = LineItem {
            product_id: "p".to_string(),
            name: "P".to_string(),
            unit_price: Money::from_cents(100),
            quantity: qty,
            option_adjustments: vec![],
            notes: None,
        };
        let rejected = matches!(compute_total(&[item]), Err(CoreError::InvalidQuantity { .. }));
        prop_assert!(rejected, "quantity {} should be rejected", qty);
    }
}
