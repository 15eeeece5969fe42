//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Snapshot construction failures                 │
//! │  └── ValidationError  - Field-level rule violations                    │
//! │                                                                         │
//! │  storefront-cart errors (separate crate)                               │
//! │  └── CartError        - Config, transport and response failures        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → tracing (refresh)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field and value in the message
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while building a [`CartSnapshot`](crate::CartSnapshot).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cart has more lines than a storefront cart can hold.
    #[error("Cart cannot have more than {max} line items (got {actual})")]
    CartTooLarge { max: usize, actual: usize },

    /// A specific line item failed validation.
    ///
    /// ## When This Occurs
    /// ```text
    /// GET /cart.js
    ///      │
    ///      ▼
    /// items[1].quantity = 0
    ///      │
    ///      ▼
    /// InvalidLineItem { index: 1, source: MustBePositive { field: "quantity" } }
    ///      │
    ///      ▼
    /// refresh() logs and keeps the previous snapshot
    /// ```
    #[error("Line item {index} is invalid: {source}")]
    InvalidLineItem {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// Validation error on a cart-level field.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: i64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., a currency code that is not ISO 4217 shaped).
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
        let err = CoreError::CartTooLarge {
            max: 500,
            actual: 501,
        };
        assert_eq!(
            err.to_string(),
            "Cart cannot have more than 500 line items (got 501)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "key".to_string(),
        };
        assert_eq!(err.to_string(), "key is required");

        let err = ValidationError::Negative {
            field: "items_subtotal_price".to_string(),
            value: -1,
        };
        assert_eq!(
            err.to_string(),
            "items_subtotal_price must not be negative (got -1)"
        );
    }

    #[test]
    fn test_line_item_error_names_index() {
        let err = CoreError::InvalidLineItem {
            index: 2,
            source: ValidationError::MustBePositive {
                field: "quantity".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Line item 2 is invalid: quantity must be positive"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
