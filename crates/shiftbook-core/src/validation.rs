//! # Validation Module
//!
//! Input validation utilities for Shiftbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (TypeScript)                                         │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, before any ledger state is touched     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on amounts and quantities                       │
//! │  ├── UNIQUE order numbers, one active shift per register               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shiftbook_core::validation::{validate_notes, validate_operator_id};
//!
//! validate_operator_id("cashier-7").unwrap();
//!
//! // Blank notes collapse to None
//! assert_eq!(validate_notes(Some("   ")).unwrap(), None);
//! ```

use crate::error::ValidationError;
use crate::MAX_NOTES_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest table label a console can print on a ticket.
pub const MAX_TABLE_NUMBER_LENGTH: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the operator identity taken from the bearer token.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 100 characters
pub fn validate_operator_id(operator_id: &str) -> ValidationResult<()> {
    let operator_id = operator_id.trim();

    if operator_id.is_empty() {
        return Err(ValidationError::Required {
            field: "operatorId".to_string(),
        });
    }

    if operator_id.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "operatorId".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates free-text shift notes.
///
/// ## Returns
/// The trimmed notes, or `None` when absent or blank.
///
/// ## Example
/// ```rust
/// use shiftbook_core::validation::validate_notes;
///
/// assert_eq!(validate_notes(Some(" till short on coins ")).unwrap().as_deref(),
///            Some("till short on coins"));
/// assert!(validate_notes(Some(&"x".repeat(501))).is_err());
/// ```
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim) else {
        return Ok(None);
    };

    if notes.is_empty() {
        return Ok(None);
    }

    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(Some(notes.to_string()))
}

/// Validates the table label of a dine-in order.
///
/// ## Returns
/// The trimmed table number.
pub fn validate_table_number(table_number: Option<&str>) -> ValidationResult<String> {
    let table = table_number.map(str::trim).unwrap_or_default();

    if table.is_empty() {
        return Err(ValidationError::Required {
            field: "tableNumber".to_string(),
        });
    }

    if table.len() > MAX_TABLE_NUMBER_LENGTH {
        return Err(ValidationError::TooLong {
            field: "tableNumber".to_string(),
            max: MAX_TABLE_NUMBER_LENGTH,
        });
    }

    Ok(table.to_string())
}

/// Validates that a takeout order carries no table.
pub fn validate_no_table(table_number: Option<&str>) -> ValidationResult<()> {
    match table_number.map(str::trim) {
        Some(t) if !t.is_empty() => Err(ValidationError::NotAllowed {
            field: "tableNumber".to_string(),
            context: "for takeout orders".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates the snapshot fields of a line item.
pub fn validate_line_item_snapshot(product_id: &str, name: &str) -> ValidationResult<()> {
    if product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use shiftbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_operator_id() {
        assert!(validate_operator_id("cashier-7").is_ok());
        assert!(validate_operator_id("").is_err());
        assert!(validate_operator_id("   ").is_err());
        assert!(validate_operator_id(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("")).unwrap(), None);
        assert_eq!(
            validate_notes(Some("float counted twice")).unwrap().as_deref(),
            Some("float counted twice")
        );
        assert!(validate_notes(Some(&"é".repeat(500))).is_ok());
        assert!(matches!(
            validate_notes(Some(&"x".repeat(501))),
            Err(ValidationError::TooLong { max: 500, .. })
        ));
    }

    #[test]
    fn test_validate_table_number() {
        assert_eq!(validate_table_number(Some(" T4 ")).unwrap(), "T4");
        assert!(validate_table_number(None).is_err());
        assert!(validate_table_number(Some("  ")).is_err());
        assert!(validate_table_number(Some(&"9".repeat(21))).is_err());
    }

    #[test]
    fn test_validate_no_table() {
        assert!(validate_no_table(None).is_ok());
        assert!(validate_no_table(Some("")).is_ok());
        assert!(validate_no_table(Some("T4")).is_err());
    }

    #[test]
    fn test_validate_line_item_snapshot() {
        assert!(validate_line_item_snapshot("p1", "Latte").is_ok());
        assert!(validate_line_item_snapshot("", "Latte").is_err());
        assert!(validate_line_item_snapshot("p1", " ").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
