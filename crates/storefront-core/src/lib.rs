//! # storefront-core: Pure Cart Types for the Storefront Theme
//!
//! This crate holds the cart model that every other crate in the workspace
//! agrees on. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Cart Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Widgets (storefront-widgets)                    │   │
//! │  │    CartDrawer ──► AddToCartHook ──► Analytics ──► Countdown     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<CartStore>                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 CartStore (storefront-cart)                     │   │
//! │  │         refresh() ──► CartService ──► GET /cart.js              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌──────────────┐            │   │
//! │  │   │   money   │  │    types     │  │  validation  │            │   │
//! │  │   │   Money   │  │ CartSnapshot │  │ ingress rules│            │   │
//! │  │   │           │  │   LineItem   │  │              │            │   │
//! │  │   └───────────┘  └──────────────┘  └──────────────┘            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `CartSnapshot` and `LineItem`
//! - [`money`] - Money type in minor units (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Rules applied to remote cart payloads on ingress
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{CartSnapshot, Money};
//!
//! let empty = CartSnapshot::empty();
//! assert_eq!(empty.item_count, 0);
//! assert_eq!(empty.subtotal, Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items accepted in a single cart snapshot.
///
/// Hosted storefront carts are capped at 500 lines; anything larger is
/// treated as a malformed response rather than rendered.
pub const MAX_CART_LINES: usize = 500;
