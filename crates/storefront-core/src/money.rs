//! # Money Module
//!
//! Provides the `Money` type for cart amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The storefront already sends integer minor units:                     │
//! │    "items_subtotal_price": 4599   → 45.99                               │
//! │                                                                         │
//! │  OUR SOLUTION: keep them as integers end to end                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let subtotal = Money::from_cents(4599);
//! assert_eq!(subtotal.format_with_currency(Some("USD")), "45.99 USD");
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// The currency itself is implied by the storefront and carried separately
/// on [`CartSnapshot::currency`](crate::CartSnapshot::currency) when the
/// remote service reports it.
///
/// ## Where Money is Used
/// ```text
/// LineItem.price ──► LineItem.line_price ──┐
///                                          ├──► CartSnapshot.subtotal
/// (remote: items_subtotal_price) ──────────┘         │
///                                                    ▼
///                                   DrawerView.subtotal ("45.99 USD")
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4599).major(), 45);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Formats the amount as a plain decimal followed by a currency code,
    /// e.g. `45.99 USD`. Without a code only the decimal is returned.
    pub fn format_with_currency(&self, currency: Option<&str>) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let amount = format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part());
        match currency {
            Some(code) => format!("{} {}", amount, code),
            None => amount,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(4599);
        assert_eq!(money.cents(), 4599);
        assert_eq!(money.major(), 45);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_format_with_currency() {
        let subtotal = Money::from_cents(4599);
        assert_eq!(subtotal.format_with_currency(Some("USD")), "45.99 USD");
        assert_eq!(subtotal.format_with_currency(None), "45.99");
        assert_eq!(Money::from_cents(7).format_with_currency(Some("EUR")), "0.07 EUR");
    }

    #[test]
    fn test_negative_amounts_format_with_sign() {
        assert_eq!(Money::from_cents(-550).format_with_currency(None), "-5.50");
        assert_eq!(Money::from_cents(-7).format_with_currency(Some("USD")), "-0.07 USD");
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(4599)).unwrap();
        assert_eq!(json, "4599");
    }
}
