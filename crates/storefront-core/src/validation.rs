//! # Validation Module
//!
//! Rules applied to remote cart payloads before they become a
//! [`CartSnapshot`](crate::CartSnapshot).
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ingress Layers                                     │
//! │                                                                         │
//! │  Layer 1: serde (storefront-cart::protocol)                            │
//! │  ├── Field presence and JSON types                                     │
//! │  └── Missing field → MalformedResponse                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Signs and ranges (no negative counts or prices)                   │
//! │  ├── Required identities (line key, title)                             │
//! │  └── Currency code shape                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  CartStore swaps the snapshot in, or keeps the previous one            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_item_count, validate_quantity};
//!
//! assert_eq!(validate_item_count(3).unwrap(), 3);
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_CART_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_required;
///
/// assert_eq!(validate_required("key", " 123:abc ").unwrap(), "123:abc");
/// assert!(validate_required("key", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Validates an ISO 4217 currency code (three ASCII uppercase letters).
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: format!("expected a 3-letter uppercase code, got '{}'", code),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the cart-level item count and narrows it to `u32`.
///
/// ## Rules
/// - Zero is allowed (empty cart)
/// - Must not be negative
/// - Must fit in `u32`
pub fn validate_item_count(count: i64) -> ValidationResult<u32> {
    validate_non_negative("item_count", count)?;

    u32::try_from(count).map_err(|_| ValidationError::OutOfRange {
        field: "item_count".to_string(),
        min: 0,
        max: i64::from(u32::MAX),
    })
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0); a storefront never returns empty lines
/// - Must fit in `u32`
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    u32::try_from(qty).map_err(|_| ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: i64::from(u32::MAX),
    })
}

/// Validates a monetary amount in minor units.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_amount;
///
/// assert_eq!(validate_amount("price", 1099).unwrap().cents(), 1099);
/// assert!(validate_amount("price", 0).is_ok());      // Free item
/// assert!(validate_amount("price", -100).is_err());
/// ```
pub fn validate_amount(field: &str, cents: i64) -> ValidationResult<Money> {
    validate_non_negative(field, cents)?;
    Ok(Money::from_cents(cents))
}

/// Rejects negative values.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a storefront identifier (product or variant id).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<u64> {
    u64::try_from(id).map_err(|_| ValidationError::Negative {
        field: field.to_string(),
        value: id,
    })
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates the number of lines in a cart.
pub fn validate_line_count(count: usize) -> CoreResult<()> {
    if count > MAX_CART_LINES {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_LINES,
            actual: count,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
