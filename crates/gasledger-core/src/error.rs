//! # Error Types
//!
//! Domain-specific error types for gasledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  gasledger-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                   │
//! │  └── ValidationError  - Input validation failures                  │
//! │                                                                     │
//! │  gasledger-db errors (separate crate)                               │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── SaleError        - Multi-step sale write failures              │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → SaleError → Caller   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, counts, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::StockShortage;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Requested quantity exceeds currently available stock for one or
    /// more lines. Detected before any write begins.
    ///
    /// ## User Workflow
    /// ```text
    /// Request: qty 7 of item A
    ///      │
    ///      ▼
    /// Stock check: available = 6
    ///      │
    ///      ▼
    /// InsufficientStock([{ item_id: A, available: 6, requested: 7 }])
    ///      │
    ///      ▼
    /// UI shows: "Only 6 of A in stock"
    /// ```
    #[error("Insufficient stock for {} item(s)", .0.len())]
    InsufficientStock(Vec<StockShortage>),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock(vec![StockShortage {
            item_id: "a1".to_string(),
            available: 3,
            requested: 5,
        }]);
        assert_eq!(err.to_string(), "Insufficient stock for 1 item(s)");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
