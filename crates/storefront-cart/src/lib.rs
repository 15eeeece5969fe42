//! # storefront-cart: Cart Store for the Storefront Theme
//!
//! This crate keeps a page-lifetime copy of the shopper's cart in step with
//! the storefront's remote Cart Service, and tells interested widgets when
//! the cart drawer opens or closes.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Store Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     CartStore (shared via Arc)                   │  │
//! │  │                                                                  │  │
//! │  │  snapshot: Arc<CartSnapshot>     is_open: bool                   │  │
//! │  │  replaced by refresh()           flipped by toggle()             │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  │                              │                       │
//! │                  ▼                              ▼                       │
//! │  ┌────────────────────────────┐   ┌──────────────────────────────┐     │
//! │  │ CartService (trait)        │   │ ListenerRegistry             │     │
//! │  │                            │   │                              │     │
//! │  │ HttpCartService:           │   │ CartEvent::Toggled           │     │
//! │  │ GET /cart.js via reqwest   │   │ delivered to subscribers     │     │
//! │  └─────────────┬──────────────┘   └──────────────────────────────┘     │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  ┌────────────────────────────┐                                        │
//! │  │ protocol::RemoteCart       │                                        │
//! │  │ validated into a           │                                        │
//! │  │ storefront_core::CartSnapshot                                       │
//! │  └────────────────────────────┘                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Storefront, ordering, analytics and widget settings
//! - [`error`] - Cart error types
//! - [`events`] - Cart events and listener subscriptions
//! - [`protocol`] - Wire types for the cart JSON endpoint
//! - [`service`] - `CartService` trait and its HTTP implementation
//! - [`store`] - The `CartStore` itself
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_cart::{CartStore, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let store = Arc::new(CartStore::from_config(&config)?);
//! store.initialize().await;
//!
//! let snapshot = store.snapshot();
//! println!(
//!     "{} items, {}",
//!     snapshot.item_count,
//!     snapshot.subtotal.format_with_currency(snapshot.currency.as_deref())
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod protocol;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{
    AnalyticsSettings, CartSettings, RefreshOrdering, StorefrontConfig, StorefrontSettings,
    WidgetSettings,
};
pub use error::{CartError, CartResult};
pub use events::{CartEvent, CartListener, ListenerRegistry, SubscriptionId};
pub use protocol::{RemoteCart, RemoteLineItem};
pub use service::{CartService, HttpCartService};
pub use store::{CartStore, RefreshOutcome};
