//! # Domain Types
//!
//! Core domain types used throughout Shiftbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Shift       │   │  Order (order)  │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  shift_id (FK)  │   │  product_id     │       │
//! │  │  status         │   │  order_number   │──►│  unit_price     │       │
//! │  │  total_orders   │   │  status         │   │  quantity       │       │
//! │  │  total_sales    │   │  total_amount   │   │  adjustments    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ShiftStatus    │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Active         │   │  Pending        │   │  Cash           │       │
//! │  │  Closed         │   │  Completed      │   │  Card           │       │
//! │  └─────────────────┘   │  Cancelled      │   │  Other          │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every struct serializes with camelCase field names and every enum with
//! snake_case values, matching what the consoles already send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Shift Status
// =============================================================================

/// Lifecycle of a single shift. A closed shift never reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Drawer is open and accepting orders.
    Active,
    /// Drawer counted, totals frozen.
    Closed,
}

impl ShiftStatus {
    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Active => "active",
            ShiftStatus::Closed => "closed",
        }
    }
}

// =============================================================================
// Shift
// =============================================================================

/// One operator session at a register, from opening float to counted cash.
///
/// ## Invariants
/// - `status == Closed` exactly when `end_time` and `closing_user_id` are set
/// - `total_sales` is the sum of every completed order attached to the shift
/// - aggregates only grow while active and never change once closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// When the shift was opened.
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,

    /// When the shift was closed.
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,

    /// Operator who opened the drawer.
    pub opening_user_id: String,

    /// Operator who counted and closed the drawer.
    pub closing_user_id: Option<String>,

    /// Opening float.
    pub start_cash_amount: Money,

    /// Cash counted at close.
    pub end_cash_amount: Option<Money>,

    pub status: ShiftStatus,

    /// Number of completed orders recorded against this shift.
    #[ts(type = "number")]
    pub total_orders: i64,

    /// Sum of completed order totals.
    pub total_sales: Money,

    pub notes: Option<String>,
}

impl Shift {
    /// Checks if the shift is accepting orders.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ShiftStatus::Active
    }

    /// Opening float plus everything sold so far.
    ///
    /// This is what the operator should count in the drawer at close.
    pub fn expected_cash(&self) -> crate::error::CoreResult<Money> {
        self.start_cash_amount.checked_add(self.total_sales)
    }
}

// =============================================================================
// Order Type
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Served at a table; a table number is required.
    DineIn,
    /// Carried out; no table.
    Takeout,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeout => "takeout",
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order lifecycle. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Vouchers, transfers and anything else settled outside the drawer.
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Other => "other",
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A priced product option ("Extra shot +50", "No cheese -30").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OptionAdjustment {
    pub label: String,
    /// May be negative for discounts.
    pub amount: Money,
}

/// A line in an order.
/// Uses snapshot pattern to freeze product name and price at time of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub name: String,
    /// Base unit price at time of order (frozen).
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub option_adjustments: Vec<OptionAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notes: Option<String>,
}

impl LineItem {
    /// Unit price plus every option adjustment, unchecked for sign.
    pub fn adjusted_unit_price(&self) -> crate::error::CoreResult<Money> {
        self.option_adjustments
            .iter()
            .try_fold(self.unit_price, |acc, adj| acc.checked_add(adj.amount))
    }

    /// Two lines merge when the product and its chosen options match.
    pub fn same_configuration(&self, other: &LineItem) -> bool {
        self.product_id == other.product_id
            && self.unit_price == other.unit_price
            && self.option_adjustments == other.option_adjustments
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
