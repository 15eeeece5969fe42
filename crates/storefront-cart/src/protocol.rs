//! # Cart Service Protocol
//!
//! Wire types for the storefront's cart JSON endpoint and their conversion
//! into a validated [`CartSnapshot`].
//!
//! ## Payload Shape
//! ```json
//! {
//!   "item_count": 3,
//!   "items_subtotal_price": 4599,
//!   "currency": "USD",
//!   "items": [
//!     {
//!       "key": "39872654311523:4b1f...",
//!       "id": 39872654311523,
//!       "product_id": 6612345678901,
//!       "title": "Linen Shirt - M",
//!       "quantity": 2,
//!       "price": 1800,
//!       "line_price": 3600,
//!       "sku": "LS-M",
//!       "vendor": "Acme",
//!       "url": "/products/linen-shirt?variant=39872654311523"
//!     }
//!   ]
//! }
//! ```
//!
//! Fields the store doesn't use (token, attributes, weights, ...) are
//! ignored. Numbers are read as signed integers so negative values reach
//! validation and are rejected there instead of failing as a type error.
//! Money fields may also arrive as decimals (`4599.0`); a decimal is
//! accepted when it has no fractional part.

use serde::{de, Deserialize, Deserializer, Serialize};
use storefront_core::validation::{
    validate_amount, validate_id, validate_item_count, validate_quantity, validate_required,
};
use storefront_core::{CartSnapshot, CoreError, LineItem};
use tracing::warn;

use crate::error::CartResult;

// =============================================================================
// Amounts
// =============================================================================

/// Reads a minor-unit amount sent either as an integer or as a decimal with
/// no fractional part.
fn minor_units<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(amount) = number.as_i64() {
        return Ok(amount);
    }

    match number.as_f64() {
        Some(amount)
            if amount.fract() == 0.0 && amount >= i64::MIN as f64 && amount < i64::MAX as f64 =>
        {
            Ok(amount as i64)
        }
        _ => Err(de::Error::custom(format!(
            "expected a whole number of minor units, got {}",
            number
        ))),
    }
}

// =============================================================================
// Remote Cart
// =============================================================================

/// The cart as returned by the remote Cart Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCart {
    pub item_count: i64,
    pub items: Vec<RemoteLineItem>,
    /// Subtotal of all lines in minor units.
    #[serde(deserialize_with = "minor_units")]
    pub items_subtotal_price: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// One line of the remote cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLineItem {
    pub key: String,
    /// Variant id.
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    pub quantity: i64,
    #[serde(deserialize_with = "minor_units")]
    pub price: i64,
    #[serde(deserialize_with = "minor_units")]
    pub line_price: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RemoteLineItem {
    fn into_line_item(self, index: usize) -> Result<LineItem, CoreError> {
        let at = |source| CoreError::InvalidLineItem { index, source };

        Ok(LineItem {
            key: validate_required("key", &self.key).map_err(at)?,
            variant_id: validate_id("id", self.id).map_err(at)?,
            product_id: validate_id("product_id", self.product_id).map_err(at)?,
            title: validate_required("title", &self.title).map_err(at)?,
            quantity: validate_quantity(self.quantity).map_err(at)?,
            price: validate_amount("price", self.price).map_err(at)?,
            line_price: validate_amount("line_price", self.line_price).map_err(at)?,
            sku: self.sku.filter(|s| !s.trim().is_empty()),
            vendor: self.vendor.filter(|s| !s.trim().is_empty()),
            url: self.url.filter(|s| !s.trim().is_empty()),
        })
    }
}

impl RemoteCart {
    /// Parses a response body.
    ///
    /// Returns `MalformedResponse` when the body isn't JSON or is missing a
    /// required field.
    pub fn from_slice(body: &[u8]) -> CartResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Validates the payload and converts it into a snapshot.
    ///
    /// The storefront's `item_count` is kept as-is. If it disagrees with the
    /// line quantities a warning is logged, since the remote side is the
    /// source of truth.
    pub fn into_snapshot(self) -> CartResult<CartSnapshot> {
        let item_count = validate_item_count(self.item_count).map_err(CoreError::from)?;
        let subtotal =
            validate_amount("items_subtotal_price", self.items_subtotal_price).map_err(CoreError::from)?;

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.into_line_item(index))
            .collect::<Result<Vec<_>, _>>()?;

        let currency = self.currency.filter(|c| !c.is_empty());
        let snapshot = CartSnapshot::try_new(item_count, items, subtotal, currency)?;

        if !snapshot.count_matches_items() {
            warn!(
                item_count = snapshot.item_count,
                quantity_total = snapshot.quantity_total(),
                "Storefront item_count disagrees with line quantities; keeping storefront count"
            );
        }

        Ok(snapshot)
    }
}
