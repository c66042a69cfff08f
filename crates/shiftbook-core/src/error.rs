//! # Error Types
//!
//! Domain-specific error types for shiftbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shiftbook-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger and order rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shiftbook-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  ledger-api errors (in app)                                            │
//! │  ├── RegisterError    - Register actor failures                        │
//! │  └── ApiError         - What consoles see ({ code, message })          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Console      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (shift ID, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant belongs to exactly one [`ErrorKind`]

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Nothing about current state makes it acceptable.
    Validation,
    /// Input is well formed but conflicts with the ledger's current state.
    Conflict,
    /// Tendered cash does not cover the order.
    Payment,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every operation that returns one of these leaves the ledger and the order
/// it was given untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A shift is already open on this register.
    ///
    /// ## When This Occurs
    /// - Operator presses "Start shift" while another operator's shift is open
    /// - Two consoles race to open the first shift of the day
    #[error("Shift {shift_id} is already active")]
    ShiftAlreadyActive { shift_id: String },

    /// The operation needs an active shift and there is none.
    #[error("No active shift")]
    NoActiveShift,

    /// The caller targeted a shift that is not the active one.
    ///
    /// ## When This Occurs
    /// ```text
    /// Console A holds shift S1 ─────────────┐
    ///                                       │
    /// Console B closes S1, opens S2         │
    ///                                       ▼
    /// Console A posts order for S1 ──► ShiftMismatch { expected: S2, actual: S1 }
    /// ```
    /// `expected` is `None` when the targeted shift was already closed and no
    /// other shift is active.
    #[error("Shift mismatch: active shift is {expected:?}, request targeted {actual}")]
    ShiftMismatch {
        expected: Option<String>,
        actual: String,
    },

    /// A reconciliation was requested for a shift that is still open.
    #[error("Shift {shift_id} is not closed")]
    ShiftNotClosed { shift_id: String },

    /// A monetary input is negative where only non-negative is allowed.
    #[error("Invalid amount for {field}: {cents}")]
    InvalidAmount { field: String, cents: i64 },

    /// Line item quantity is outside 1..=max.
    #[error("Invalid quantity {quantity} (must be between 1 and {max})")]
    InvalidQuantity { quantity: i64, max: i64 },

    /// A line item cannot be priced.
    ///
    /// ## When This Occurs
    /// - Order has no line items at all
    /// - Unit price is negative
    /// - Option discounts push the adjusted unit price below zero
    /// - Line index for replace/remove does not exist
    #[error("Invalid line item: {reason}")]
    InvalidLineItem { reason: String },

    /// Tendered cash is less than the order total.
    ///
    /// ## User Workflow
    /// ```text
    /// Order total: $4.30
    ///      │
    ///      ▼
    /// Cash received: $4.00
    ///      │
    ///      ▼
    /// InsufficientPayment { required: 430, received: 400 }
    ///      │
    ///      ▼
    /// Console shows: "Cash received is less than the total"
    /// ```
    #[error("Insufficient payment: required {required}, received {received}")]
    InsufficientPayment { required: i64, received: i64 },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Completing a cancelled order
    /// - Cancelling a completed order
    /// - Editing line items of a terminal order
    #[error("Order {order_id} is {status}, cannot {action}")]
    InvalidTransition {
        order_id: String,
        status: String,
        action: String,
    },

    /// A non-negative subtraction would have gone below zero.
    #[error("Subtraction {minuend} - {subtrahend} would be negative")]
    NegativeResult { minuend: i64, subtrahend: i64 },

    /// Arithmetic left the representable range.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for transport mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidAmount { .. }
            | CoreError::InvalidQuantity { .. }
            | CoreError::InvalidLineItem { .. }
            | CoreError::NegativeResult { .. }
            | CoreError::AmountOverflow
            | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::ShiftAlreadyActive { .. }
            | CoreError::NoActiveShift
            | CoreError::ShiftMismatch { .. }
            | CoreError::ShiftNotClosed { .. }
            | CoreError::InvalidTransition { .. } => ErrorKind::Conflict,
            CoreError::InsufficientPayment { .. } => ErrorKind::Payment,
        }
    }

    /// Stable machine-readable code (SCREAMING_SNAKE_CASE) for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ShiftAlreadyActive { .. } => "SHIFT_ALREADY_ACTIVE",
            CoreError::NoActiveShift => "NO_ACTIVE_SHIFT",
            CoreError::ShiftMismatch { .. } => "SHIFT_MISMATCH",
            CoreError::ShiftNotClosed { .. } => "SHIFT_NOT_CLOSED",
            CoreError::InvalidAmount { .. } => "INVALID_AMOUNT",
            CoreError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CoreError::InvalidLineItem { .. } => "INVALID_LINE_ITEM",
            CoreError::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::NegativeResult { .. } => "NEGATIVE_RESULT",
            CoreError::AmountOverflow => "AMOUNT_OVERFLOW",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field must be absent in this context.
    #[error("{field} is not allowed {context}")]
    NotAllowed { field: String, context: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
