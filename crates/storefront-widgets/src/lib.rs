//! # storefront-widgets: Theme Widgets
//!
//! The interactive theme components that consume the cart store. Every
//! widget is handed what it needs explicitly; there is no global store.
//!
//! ## Widget Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   product form ──► AddToCartHook ──┬──► AnalyticsTracker ──► Sink       │
//! │                                    │        (add_to_cart)               │
//! │                                    ▼                                    │
//! │                           Arc<CartStore>::refresh()                     │
//! │                                    │                                    │
//! │   header button ──► toggle() ──────┤                                    │
//! │                                    ▼                                    │
//! │                         CartEvent::Toggled ──► CartDrawer::view()       │
//! │                                                                         │
//! │   pointer leaves page ──► ExitIntent ──► ExitIntentListener (once)      │
//! │                                                                         │
//! │   [data-countdown] ──► Countdown::run() ──► "1h 2m 3s" … "Offer expired!"│
//! │                                                                         │
//! │   img[data-src] in view ──► LazyImageLoader ──► src swapped once        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`add_to_cart`] - Post-add hook: track, then refresh
//! - [`analytics`] - gtag-shaped event tracking
//! - [`countdown`] - Urgency timers
//! - [`drawer`] - Cart drawer bound to store notifications
//! - [`exit_intent`] - One-shot exit-intent latch
//! - [`lazy_load`] - Deferred images and critical-image preload hints

pub mod add_to_cart;
pub mod analytics;
pub mod countdown;
pub mod drawer;
pub mod exit_intent;
pub mod lazy_load;

pub use add_to_cart::AddToCartHook;
pub use analytics::{
    AnalyticsEvent, AnalyticsItem, AnalyticsSink, AnalyticsTracker, GtagCall, GtagCommand,
    MemorySink, ProductSummary, TracingSink,
};
pub use countdown::{parse_countdown_attr, Countdown, CountdownDisplay};
pub use drawer::{CartDrawer, DrawerLine, DrawerView};
pub use exit_intent::{ExitIntent, ExitIntentListener, EXIT_INTENT_EVENT};
pub use lazy_load::{critical_preloads, LazyImage, LazyImageLoader, PreloadLink, LAZY_CLASS};
