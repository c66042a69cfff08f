//! # shiftbook-core: Pure Business Logic for Shiftbook
//!
//! This crate is the **heart** of Shiftbook. It contains the shift ledger,
//! order pricing and cash reconciliation as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shiftbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Consoles (admin dashboard, merchant)              │   │
//! │  │   Start shift ──► Take orders ──► Count drawer ──► Close shift  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ledger-api (register actor)                     │   │
//! │  │          open_shift, place_order, close_shift, queries          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shiftbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   order   │  │  ledger   │  │reconcile  │  │   │
//! │  │   │   Money   │  │   Order   │  │  Shift    │  │  Report   │  │   │
//! │  │   │           │  │  totals   │  │  Ledger   │  │ variance  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  shiftbook-db (Database Layer)                  │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shift, LineItem, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - Order pricing and the pending/completed/cancelled lifecycle
//! - [`ledger`] - Single-active-shift state machine
//! - [`reconciliation`] - Expected cash and variance of a closed shift
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use shiftbook_core::ledger::{CloseShift, OpenShift, ShiftLedger};
//! use shiftbook_core::Money;
//!
//! let mut ledger = ShiftLedger::new();
//! let shift = ledger
//!     .open_shift(
//!         OpenShift {
//!             start_cash_amount: Money::from_cents(1000),
//!             operator_id: "alice".into(),
//!             notes: None,
//!         },
//!         "shift-1".into(),
//!         Utc::now(),
//!     )
//!     .unwrap();
//!
//! ledger.record_completed_order(&shift.id, "order-1", Money::from_cents(280)).unwrap();
//! ledger.record_completed_order(&shift.id, "order-2", Money::from_cents(160)).unwrap();
//!
//! let (_, report) = ledger
//!     .close_shift(
//!         CloseShift {
//!             end_cash_amount: Money::from_cents(1440),
//!             operator_id: "alice".into(),
//!             notes: None,
//!             expected_shift_id: Some(shift.id.clone()),
//!         },
//!         Utc::now(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(report.expected_end_cash.cents(), 1440);
//! assert!(report.variance.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod order;
pub mod reconciliation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shiftbook_core::Money` instead of
// `use shiftbook_core::money::Money`

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use ledger::{CloseShift, OpenShift, RecordOutcome, ShiftLedger};
pub use money::Money;
pub use order::{Order, OrderCompletion, OrderDraft, OrderRecord};
pub use reconciliation::{ReconciliationOutcome, ReconciliationReport, SuggestedEndCash};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of shift notes, in characters.
pub const MAX_NOTES_LENGTH: usize = 500;
