//! # Domain Types
//!
//! The cart model consumed by the store and by every widget.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐         ┌──────────────────────┐             │
//! │  │    CartSnapshot      │ 1     * │      LineItem        │             │
//! │  │  ──────────────────  │────────►│  ──────────────────  │             │
//! │  │  item_count (u32)    │         │  key (identity)      │             │
//! │  │  items (ordered)     │         │  variant_id          │             │
//! │  │  subtotal (Money)    │         │  quantity (≥ 1)      │             │
//! │  │  currency (ISO)      │         │  price / line_price  │             │
//! │  └──────────────────────┘         └──────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! A `CartSnapshot` is replaced wholesale on every successful refresh and is
//! never edited in place. The store hands out `Arc<CartSnapshot>`, so a reader
//! holding an old snapshot keeps a consistent view even after a swap.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::{validate_currency, validate_line_count, validate_non_negative};

// =============================================================================
// Line Item
// =============================================================================

/// One product variant entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line identity assigned by the storefront (stable across quantity changes).
    pub key: String,

    /// Variant identifier.
    #[ts(type = "number")]
    pub variant_id: u64,

    /// Product identifier.
    #[ts(type = "number")]
    pub product_id: u64,

    /// Display title shown in the drawer.
    pub title: String,

    /// Quantity of this variant, always at least 1.
    pub quantity: u32,

    /// Unit price.
    pub price: Money,

    /// Price for the whole line, as reported by the storefront.
    pub line_price: Money,

    pub sku: Option<String>,
    pub vendor: Option<String>,

    /// Relative product URL.
    pub url: Option<String>,
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// The cart's contents at one point in time.
///
/// ## Invariants
/// - `item_count` is the storefront's own count and is never recomputed
///   locally; see [`CartSnapshot::count_matches_items`]
/// - `items` keeps the order returned by the storefront
/// - `subtotal` is never negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Total quantity across all line items.
    pub item_count: u32,

    /// Line items in storefront order.
    pub items: Vec<LineItem>,

    /// Items subtotal in minor units.
    pub subtotal: Money,

    /// ISO 4217 currency code, when the storefront reports one.
    pub currency: Option<String>,
}

impl CartSnapshot {
    /// The snapshot a store starts with before its first refresh completes.
    pub fn empty() -> Self {
        CartSnapshot {
            item_count: 0,
            items: Vec::new(),
            subtotal: Money::zero(),
            currency: None,
        }
    }

    /// Builds a snapshot, enforcing the cart-level rules.
    ///
    /// ## Errors
    /// - `CartTooLarge` when `items` exceeds [`MAX_CART_LINES`](crate::MAX_CART_LINES)
    /// - `Validation` when `subtotal` is negative or `currency` is malformed
    pub fn try_new(
        item_count: u32,
        items: Vec<LineItem>,
        subtotal: Money,
        currency: Option<String>,
    ) -> CoreResult<Self> {
        validate_line_count(items.len())?;
        validate_non_negative("items_subtotal_price", subtotal.cents())?;
        if let Some(code) = currency.as_deref() {
            validate_currency(code)?;
        }

        Ok(CartSnapshot {
            item_count,
            items,
            subtotal,
            currency,
        })
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of line quantities, computed locally.
    pub fn quantity_total(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Whether the storefront's `item_count` agrees with the line quantities.
    ///
    /// A mismatch is not an error: the storefront is authoritative and the
    /// store keeps its count. Callers log it.
    pub fn count_matches_items(&self) -> bool {
        u64::from(self.item_count) == self.quantity_total()
    }

    /// Finds a line by its storefront key.
    pub fn line(&self, key: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.key == key)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        CartSnapshot::empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
