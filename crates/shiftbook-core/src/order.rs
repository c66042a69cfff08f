//! # Order Aggregator
//!
//! Prices orders and owns their status transitions.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Order State Machine                            │
//! │                                                                         │
//! │    new_pending(draft)                                                   │
//! │          │                                                              │
//! │          ▼                                                              │
//! │    ┌───────────┐  complete(cash >= total)   ┌───────────┐               │
//! │    │  PENDING  │───────────────────────────►│ COMPLETED │──► OrderCompletion
//! │    │           │                            └───────────┘    (to ledger)│
//! │    │ add/replace/remove line items          ┌───────────┐               │
//! │    │ recompute total                        │ CANCELLED │               │
//! │    └───────────┘───────────────────────────►└───────────┘               │
//! │                      cancel()                                           │
//! │                                                                         │
//! │    Terminal orders are immutable. Every transition returns a new value. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Total Calculation
//! ```text
//! total = Σ (unit_price + Σ option_adjustments) × quantity
//! ```
//! The total is never accepted from outside. [`Order`] keeps it private and
//! recomputes it whenever line items change, including on deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineItem, OrderStatus, OrderType, PaymentMethod};
use crate::validation::{
    validate_line_item_snapshot, validate_no_table, validate_table_number,
};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Pricing
// =============================================================================

/// Prices a single line: adjusted unit price times quantity.
///
/// ## Errors
/// - `InvalidQuantity` outside 1..=999
/// - `InvalidLineItem` for a negative base or adjusted unit price
/// - `AmountOverflow` if the line cannot be represented
pub fn line_total(item: &LineItem) -> CoreResult<Money> {
    validate_line_item_snapshot(&item.product_id, &item.name)?;

    if item.quantity < 1 || item.quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::InvalidQuantity {
            quantity: item.quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }

    if item.unit_price.is_negative() {
        return Err(CoreError::InvalidLineItem {
            reason: format!("unit price of {} is negative", item.product_id),
        });
    }

    let adjusted = item.adjusted_unit_price()?;
    if adjusted.is_negative() {
        return Err(CoreError::InvalidLineItem {
            reason: format!(
                "options reduce the unit price of {} below zero",
                item.product_id
            ),
        });
    }

    adjusted.checked_multiply_quantity(item.quantity)
}

/// Computes an order total from its line items.
///
/// ## Example
/// ```rust
/// use shiftbook_core::order::compute_total;
/// use shiftbook_core::{LineItem, Money, OptionAdjustment};
///
/// let latte = LineItem {
///     product_id: "latte".into(),
///     name: "Latte".into(),
///     unit_price: Money::from_cents(120),
///     quantity: 2,
///     option_adjustments: vec![OptionAdjustment {
///         label: "Oat milk".into(),
///         amount: Money::from_cents(20),
///     }],
///     notes: None,
/// };
///
/// assert_eq!(compute_total(&[latte]).unwrap().cents(), 280);
/// ```
pub fn compute_total(items: &[LineItem]) -> CoreResult<Money> {
    items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(line_total(item)?))
}

// =============================================================================
// Order Numbers
// =============================================================================

/// Daily prefix shared by every order number issued on `date`.
pub fn order_number_prefix(date: NaiveDate) -> String {
    format!("ORD{}", date.format("%y%m%d"))
}

/// Human-readable order number: `ORD` + `yymmdd` + 4-digit daily sequence.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use shiftbook_core::order::format_order_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(format_order_number(date, 7), "ORD2403090007");
/// ```
pub fn format_order_number(date: NaiveDate, sequence: u32) -> String {
    format!("{}{:04}", order_number_prefix(date), sequence)
}

// =============================================================================
// Draft
// =============================================================================

/// What a console submits before an order exists.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub shift_id: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<String>,
    pub line_items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
}

/// Emitted once per completed order, to be applied to the shift ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCompletion {
    pub order_id: String,
    pub shift_id: String,
    pub total: Money,
}

// =============================================================================
// Order
// =============================================================================

/// An order attached to a shift.
///
/// `line_items`, `total_amount` and the status fields are private so the
/// total can only move together with its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub shift_id: String,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub payment_method: PaymentMethod,
    line_items: Vec<LineItem>,
    total_amount: Money,
    status: OrderStatus,
    cash_received: Option<Money>,
    change: Option<Money>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    completed_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds a pending order from a draft.
    ///
    /// ## Errors
    /// - `Validation` if the shift id is blank, a dine-in order has no table,
    ///   or a takeout order has one
    /// - `InvalidLineItem` if there are no line items
    /// - any pricing error from [`compute_total`]
    pub fn new_pending(
        draft: OrderDraft,
        id: String,
        order_number: String,
        now: DateTime<Utc>,
    ) -> CoreResult<Order> {
        if draft.shift_id.trim().is_empty() {
            return Err(crate::error::ValidationError::Required {
                field: "shiftId".to_string(),
            }
            .into());
        }

        let table_number = match draft.order_type {
            OrderType::DineIn => Some(validate_table_number(draft.table_number.as_deref())?),
            OrderType::Takeout => {
                validate_no_table(draft.table_number.as_deref())?;
                None
            }
        };

        if draft.line_items.is_empty() {
            return Err(CoreError::InvalidLineItem {
                reason: "order has no line items".to_string(),
            });
        }

        let total_amount = compute_total(&draft.line_items)?;

        Ok(Order {
            id,
            order_number,
            shift_id: draft.shift_id,
            order_type: draft.order_type,
            table_number,
            payment_method: draft.payment_method,
            line_items: draft.line_items,
            total_amount,
            status: OrderStatus::Pending,
            cash_received: None,
            change: None,
            created_at: now,
            completed_at: None,
            cancelled_at: None,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn cash_received(&self) -> Option<Money> {
        self.cash_received
    }

    pub fn change(&self) -> Option<Money> {
        self.change
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Completes the order with the tendered amount.
    ///
    /// ## Errors
    /// - `InvalidTransition` unless pending
    /// - `InvalidAmount` if `cash_received` is negative
    /// - `InsufficientPayment` if `cash_received < total`
    pub fn complete(&self, cash_received: Money, at: DateTime<Utc>) -> CoreResult<Order> {
        self.ensure_pending("complete")?;
        let cash_received = Money::non_negative("cashReceived", cash_received.cents())?;

        let change = cash_received
            .checked_sub_non_negative(self.total_amount)
            .map_err(|_| CoreError::InsufficientPayment {
                required: self.total_amount.cents(),
                received: cash_received.cents(),
            })?;

        let mut completed = self.clone();
        completed.status = OrderStatus::Completed;
        completed.cash_received = Some(cash_received);
        completed.change = Some(change);
        completed.completed_at = Some(at);
        Ok(completed)
    }

    /// Cancels a pending order. Cancelled orders never reach the ledger.
    pub fn cancel(&self, at: DateTime<Utc>) -> CoreResult<Order> {
        self.ensure_pending("cancel")?;

        let mut cancelled = self.clone();
        cancelled.status = OrderStatus::Cancelled;
        cancelled.cancelled_at = Some(at);
        Ok(cancelled)
    }

    /// The ledger entry for a completed order.
    pub fn completion(&self) -> Option<OrderCompletion> {
        (self.status == OrderStatus::Completed).then(|| OrderCompletion {
            order_id: self.id.clone(),
            shift_id: self.shift_id.clone(),
            total: self.total_amount,
        })
    }

    // -------------------------------------------------------------------------
    // Pending-order editing
    // -------------------------------------------------------------------------

    /// Adds a line, merging into an existing line with the same product and
    /// options by increasing its quantity.
    pub fn add_line_item(&mut self, item: LineItem) -> CoreResult<()> {
        self.ensure_pending("edit")?;

        let mut items = self.line_items.clone();
        match items.iter_mut().find(|existing| existing.same_configuration(&item)) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }

        self.apply_line_items(items)
    }

    /// Replaces the line at `index`.
    pub fn replace_line_item(&mut self, index: usize, item: LineItem) -> CoreResult<()> {
        self.ensure_pending("edit")?;

        let mut items = self.line_items.clone();
        let slot = items.get_mut(index).ok_or_else(|| missing_line(index))?;
        *slot = item;

        self.apply_line_items(items)
    }

    /// Removes the line at `index`. The last line cannot be removed.
    pub fn remove_line_item(&mut self, index: usize) -> CoreResult<()> {
        self.ensure_pending("edit")?;

        if index >= self.line_items.len() {
            return Err(missing_line(index));
        }
        let mut items = self.line_items.clone();
        items.remove(index);

        if items.is_empty() {
            return Err(CoreError::InvalidLineItem {
                reason: "order must keep at least one line item".to_string(),
            });
        }

        self.apply_line_items(items)
    }

    fn apply_line_items(&mut self, items: Vec<LineItem>) -> CoreResult<()> {
        let total = compute_total(&items)?;
        self.line_items = items;
        self.total_amount = total;
        Ok(())
    }

    fn ensure_pending(&self, action: &str) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                order_id: self.id.clone(),
                status: self.status.as_str().to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }
}

fn missing_line(index: usize) -> CoreError {
    CoreError::InvalidLineItem {
        reason: format!("no line item at index {index}"),
    }
}

// =============================================================================
// Order Record (untrusted form)
// =============================================================================

/// Field-for-field form of an [`Order`] as read from JSON or the database.
///
/// Converting into an `Order` re-prices the line items and rejects a stored
/// total or change that disagrees.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub order_number: String,
    pub shift_id: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<String>,
    pub payment_method: PaymentMethod,
    pub line_items: Vec<LineItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
    #[serde(default)]
    pub cash_received: Option<Money>,
    #[serde(default)]
    pub change: Option<Money>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = CoreError;

    fn try_from(record: OrderRecord) -> CoreResult<Order> {
        if record.line_items.is_empty() {
            return Err(CoreError::InvalidLineItem {
                reason: "order has no line items".to_string(),
            });
        }

        let total = compute_total(&record.line_items)?;
        if total != record.total_amount {
            return Err(CoreError::InvalidLineItem {
                reason: format!(
                    "stored total {} does not match line items ({})",
                    record.total_amount, total
                ),
            });
        }

        if record.status == OrderStatus::Completed {
            let (Some(cash), Some(change), Some(_)) =
                (record.cash_received, record.change, record.completed_at)
            else {
                return Err(CoreError::InvalidTransition {
                    order_id: record.id,
                    status: "completed".to_string(),
                    action: "load without payment details".to_string(),
                });
            };
            if cash.checked_sub_non_negative(total).ok() != Some(change) {
                return Err(CoreError::InsufficientPayment {
                    required: total.cents(),
                    received: cash.cents(),
                });
            }
        }

        Ok(Order {
            id: record.id,
            order_number: record.order_number,
            shift_id: record.shift_id,
            order_type: record.order_type,
            table_number: record.table_number,
            payment_method: record.payment_method,
            line_items: record.line_items,
            total_amount: total,
            status: record.status,
            cash_received: record.cash_received,
            change: record.change,
            created_at: record.created_at,
            completed_at: record.completed_at,
            cancelled_at: record.cancelled_at,
        })
    }
}

impl<'de> Deserialize<'de> for Order {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = OrderRecord::deserialize(deserializer)?;
        Order::try_from(record).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionAdjustment;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
    }

    fn item(product: &str, price: i64, qty: i64) -> LineItem {
        LineItem {
            product_id: product.to_string(),
            name: product.to_uppercase(),
            unit_price: Money::from_cents(price),
            quantity: qty,
            option_adjustments: vec![],
            notes: None,
        }
    }

    fn draft(items: Vec<LineItem>) -> OrderDraft {
        OrderDraft {
            shift_id: "shift-1".to_string(),
            order_type: OrderType::Takeout,
            table_number: None,
            line_items: items,
            payment_method: PaymentMethod::Cash,
        }
    }

    fn pending(items: Vec<LineItem>) -> Order {
        Order::new_pending(draft(items), "order-1".into(), "ORD2403090001".into(), now()).unwrap()
    }

    #[test]
    fn test_compute_total_with_adjustments() {
        let mut latte = item("latte", 450, 2);
        latte.option_adjustments = vec![
            OptionAdjustment {
                label: "Extra shot".into(),
                amount: Money::from_cents(50),
            },
            OptionAdjustment {
                label: "Small".into(),
                amount: Money::from_cents(-30),
            },
        ];
        let total = compute_total(&[latte, item("cookie", 200, 1)]).unwrap();
        assert_eq!(total.cents(), 470 * 2 + 200);
    }

    #[test]
    fn test_compute_total_rejects_bad_quantity() {
        assert!(matches!(
            compute_total(&[item("a", 100, 0)]),
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(matches!(
            compute_total(&[item("a", 100, 1000)]),
            Err(CoreError::InvalidQuantity { quantity: 1000, .. })
        ));
    }

    #[test]
    fn test_compute_total_rejects_negative_prices() {
        assert!(matches!(
            compute_total(&[item("a", -1, 1)]),
            Err(CoreError::InvalidLineItem { .. })
        ));

        let mut discounted = item("a", 100, 1);
        discounted.option_adjustments = vec![OptionAdjustment {
            label: "Comp".into(),
            amount: Money::from_cents(-150),
        }];
        assert!(matches!(
            compute_total(&[discounted]),
            Err(CoreError::InvalidLineItem { .. })
        ));
    }

    #[test]
    fn test_compute_total_overflow() {
        let huge = item("gold", i64::MAX / 2, 3);
        assert!(matches!(
            compute_total(&[huge]),
            Err(CoreError::AmountOverflow)
        ));
    }

    #[test]
    fn test_order_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(order_number_prefix(date), "ORD241231");
        assert_eq!(format_order_number(date, 42), "ORD2412310042");
    }

    #[test]
    fn test_new_pending_table_rules() {
        let mut dine_in = draft(vec![item("a", 100, 1)]);
        dine_in.order_type = OrderType::DineIn;
        assert!(matches!(
            Order::new_pending(dine_in.clone(), "o".into(), "n".into(), now()),
            Err(CoreError::Validation(_))
        ));

        dine_in.table_number = Some("T4".into());
        let order = Order::new_pending(dine_in, "o".into(), "n".into(), now()).unwrap();
        assert_eq!(order.table_number.as_deref(), Some("T4"));

        let mut takeout = draft(vec![item("a", 100, 1)]);
        takeout.table_number = Some("T4".into());
        assert!(Order::new_pending(takeout, "o".into(), "n".into(), now()).is_err());
    }

    #[test]
    fn test_new_pending_requires_items() {
        assert!(matches!(
            Order::new_pending(draft(vec![]), "o".into(), "n".into(), now()),
            Err(CoreError::InvalidLineItem { .. })
        ));
    }

    #[test]
    fn test_complete_insufficient_then_change() {
        let order = pending(vec![item("a", 430, 1)]);
        assert_eq!(order.total_amount().cents(), 430);

        let err = order.complete(Money::from_cents(400), now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                required: 430,
                received: 400
            }
        ));
        assert_eq!(order.status(), OrderStatus::Pending);

        let done = order.complete(Money::from_cents(500), now()).unwrap();
        assert_eq!(done.status(), OrderStatus::Completed);
        assert_eq!(done.change(), Some(Money::from_cents(70)));
        assert_eq!(done.completed_at(), Some(now()));

        let completion = done.completion().unwrap();
        assert_eq!(completion.total.cents(), 430);
        assert_eq!(completion.shift_id, "shift-1");
    }

    #[test]
    fn test_terminal_orders_are_immutable() {
        let order = pending(vec![item("a", 100, 1)]);
        let cancelled = order.cancel(now()).unwrap();
        assert!(cancelled.completion().is_none());
        assert!(matches!(
            cancelled.complete(Money::from_cents(100), now()),
            Err(CoreError::InvalidTransition { .. })
        ));

        let done = order.complete(Money::from_cents(100), now()).unwrap();
        assert!(matches!(
            done.cancel(now()),
            Err(CoreError::InvalidTransition { .. })
        ));

        let mut done = done;
        assert!(done.add_line_item(item("b", 100, 1)).is_err());
        assert_eq!(done.total_amount().cents(), 100);
    }

    #[test]
    fn test_add_line_item_merges() {
        let mut order = pending(vec![item("a", 100, 1)]);
        order.add_line_item(item("a", 100, 2)).unwrap();
        assert_eq!(order.line_items().len(), 1);
        assert_eq!(order.line_items()[0].quantity, 3);
        assert_eq!(order.total_amount().cents(), 300);

        order.add_line_item(item("b", 250, 1)).unwrap();
        assert_eq!(order.line_items().len(), 2);
        assert_eq!(order.total_amount().cents(), 550);
    }

    #[test]
    fn test_merge_past_max_quantity_leaves_order_unchanged() {
        let mut order = pending(vec![item("a", 100, 999)]);
        assert!(matches!(
            order.add_line_item(item("a", 100, 1)),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert_eq!(order.line_items()[0].quantity, 999);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut order = pending(vec![item("a", 100, 1), item("b", 200, 1)]);
        order.replace_line_item(1, item("c", 300, 2)).unwrap();
        assert_eq!(order.total_amount().cents(), 700);

        order.remove_line_item(0).unwrap();
        assert_eq!(order.total_amount().cents(), 600);

        assert!(order.remove_line_item(5).is_err());
        assert!(order.remove_line_item(0).is_err());
        assert_eq!(order.total_amount().cents(), 600);
    }

    #[test]
    fn test_deserialize_recomputes_and_rejects_mismatch() {
        let done = pending(vec![item("a", 280, 1)])
            .complete(Money::from_cents(300), now())
            .unwrap();

        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["totalAmount"], 280);
        let back: Order = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, done);

        let mut tampered = json;
        tampered["totalAmount"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Order>(tampered).is_err());
    }
}
