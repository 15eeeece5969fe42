//! # Analytics
//!
//! Builds gtag-shaped calls for page views, add-to-cart and search, and
//! hands them to a pluggable sink.
//!
//! ## Call Shapes
//! ```text
//! page_view    gtag('config', <measurement_id>, { page_title, page_location })
//! add_to_cart  gtag('event', 'add_to_cart', { currency, value, items: [..] })
//! search       gtag('event', 'search', { search_term })
//! ```
//!
//! Without an active measurement id the tracker drops every call, the same
//! way the theme does nothing when the analytics global is missing.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storefront_cart::AnalyticsSettings;
use storefront_core::Money;
use tracing::{debug, info};

// =============================================================================
// Events
// =============================================================================

/// A product as seen by analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub title: String,
    pub price: Money,
}

/// One entry of an e-commerce `items` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsItem {
    pub item_id: String,
    pub item_name: String,
    /// Major units, as gtag expects.
    pub price: f64,
    pub quantity: u32,
}

/// A trackable theme event.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    PageView {
        page_title: String,
        page_location: String,
    },
    AddToCart {
        currency: String,
        value: f64,
        items: Vec<AnalyticsItem>,
    },
    Search {
        search_term: String,
    },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::PageView { .. } => "page_view",
            AnalyticsEvent::AddToCart { .. } => "add_to_cart",
            AnalyticsEvent::Search { .. } => "search",
        }
    }

    /// Lowers the event to the gtag call that reports it.
    pub fn to_gtag(&self, measurement_id: &str) -> GtagCall {
        match self {
            AnalyticsEvent::PageView {
                page_title,
                page_location,
            } => GtagCall {
                command: GtagCommand::Config,
                target: measurement_id.to_string(),
                params: json!({
                    "page_title": page_title,
                    "page_location": page_location,
                }),
            },
            AnalyticsEvent::AddToCart {
                currency,
                value,
                items,
            } => GtagCall {
                command: GtagCommand::Event,
                target: self.name().to_string(),
                params: json!({
                    "currency": currency,
                    "value": value,
                    "items": items,
                }),
            },
            AnalyticsEvent::Search { search_term } => GtagCall {
                command: GtagCommand::Event,
                target: self.name().to_string(),
                params: json!({ "search_term": search_term }),
            },
        }
    }
}

fn major_units(amount: Money) -> f64 {
    amount.cents() as f64 / 100.0
}

// =============================================================================
// gtag Calls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GtagCommand {
    Config,
    Event,
}

/// A single `gtag(command, target, params)` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtagCall {
    pub command: GtagCommand,
    pub target: String,
    pub params: Value,
}

// =============================================================================
// Sinks
// =============================================================================

/// Where gtag calls go.
pub trait AnalyticsSink: Send + Sync {
    fn send(&self, call: &GtagCall);
}

/// Emits each call as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn send(&self, call: &GtagCall) {
        info!(
            command = ?call.command,
            target = %call.target,
            params = %call.params,
            "gtag"
        );
    }
}

/// Records calls in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<GtagCall>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GtagCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalyticsSink for MemorySink {
    fn send(&self, call: &GtagCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
    }
}

// =============================================================================
// Tracker
// =============================================================================

/// Turns theme actions into analytics calls.
pub struct AnalyticsTracker {
    measurement_id: Option<String>,
    currency: String,
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsTracker {
    pub fn new(settings: &AnalyticsSettings, sink: Arc<dyn AnalyticsSink>) -> Self {
        AnalyticsTracker {
            measurement_id: settings.active_measurement_id().map(str::to_string),
            currency: settings.currency.clone(),
            sink,
        }
    }

    /// A tracker that drops everything.
    pub fn disabled() -> Self {
        AnalyticsTracker {
            measurement_id: None,
            currency: String::new(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn is_active(&self) -> bool {
        self.measurement_id.is_some()
    }

    pub fn track_page_view(&self, page_title: &str, page_location: &str) -> bool {
        self.dispatch(AnalyticsEvent::PageView {
            page_title: page_title.to_string(),
            page_location: page_location.to_string(),
        })
    }

    /// Reports a single unit of `product` added to the cart.
    pub fn track_add_to_cart(&self, product: &ProductSummary) -> bool {
        let price = major_units(product.price);
        self.dispatch(AnalyticsEvent::AddToCart {
            currency: self.currency.clone(),
            value: price,
            items: vec![AnalyticsItem {
                item_id: product.product_id.clone(),
                item_name: product.title.clone(),
                price,
                quantity: 1,
            }],
        })
    }

    /// Reports a search. Empty terms are skipped; whitespace is reported
    /// as typed.
    pub fn track_search(&self, search_term: &str) -> bool {
        if search_term.is_empty() {
            debug!("Skipping empty search term");
            return false;
        }
        self.dispatch(AnalyticsEvent::Search {
            search_term: search_term.to_string(),
        })
    }

    /// Returns true if the event reached the sink.
    fn dispatch(&self, event: AnalyticsEvent) -> bool {
        let Some(measurement_id) = self.measurement_id.as_deref() else {
            debug!(event = event.name(), "Analytics inactive; dropping event");
            return false;
        };
        self.sink.send(&event.to_gtag(measurement_id));
        true
    }
}

impl std::fmt::Debug for AnalyticsTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsTracker")
            .field("measurement_id", &self.measurement_id)
            .field("currency", &self.currency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> (AnalyticsTracker, Arc<MemorySink>) {
        let settings = AnalyticsSettings {
            enabled: true,
            measurement_id: Some("G-TEST123".to_string()),
            currency: "USD".to_string(),
        };
        let sink = Arc::new(MemorySink::new());
        (AnalyticsTracker::new(&settings, sink.clone()), sink)
    }

    #[test]
    fn test_page_view_is_a_config_call() {
        let (tracker, sink) = active();
        assert!(tracker.track_page_view("Home", "https://shop.example.com/"));

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, GtagCommand::Config);
        assert_eq!(calls[0].target, "G-TEST123");
        assert_eq!(calls[0].params["page_title"], "Home");
        assert_eq!(calls[0].params["page_location"], "https://shop.example.com/");
    }

    #[test]
    fn test_add_to_cart_payload() {
        let (tracker, sink) = active();
        tracker.track_add_to_cart(&ProductSummary {
            product_id: "6612345678901".to_string(),
            title: "Linen Shirt".to_string(),
            price: Money::from_cents(4599),
        });

        let call = &sink.calls()[0];
        assert_eq!(call.command, GtagCommand::Event);
        assert_eq!(call.target, "add_to_cart");
        assert_eq!(call.params["currency"], "USD");
        assert_eq!(call.params["value"], 45.99);
        assert_eq!(call.params["items"][0]["item_id"], "6612345678901");
        assert_eq!(call.params["items"][0]["item_name"], "Linen Shirt");
        assert_eq!(call.params["items"][0]["quantity"], 1);
    }

    #[test]
    fn test_search_skips_only_empty_terms() {
        let (tracker, sink) = active();
        assert!(!tracker.track_search(""));
        assert!(tracker.track_search("   "));
        assert!(tracker.track_search("linen"));

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].params, json!({ "search_term": "   " }));
        assert_eq!(calls[1].params, json!({ "search_term": "linen" }));
    }

    #[test]
    fn test_no_measurement_id_is_a_no_op() {
        let sink = Arc::new(MemorySink::new());
        let tracker = AnalyticsTracker::new(&AnalyticsSettings::default(), sink.clone());

        assert!(!tracker.is_active());
        assert!(!tracker.track_page_view("Home", "/"));
        assert!(!tracker.track_search("linen"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_disabled_settings_are_a_no_op() {
        let sink = Arc::new(MemorySink::new());
        let settings = AnalyticsSettings {
            enabled: false,
            measurement_id: Some("G-TEST123".to_string()),
            ..Default::default()
        };
        let tracker = AnalyticsTracker::new(&settings, sink.clone());

        assert!(!tracker.track_search("linen"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_gtag_call_serializes_lowercase_command() {
        let call = AnalyticsEvent::Search {
            search_term: "mug".to_string(),
        }
        .to_gtag("G-1");
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["command"], "event");
        assert_eq!(json["target"], "search");
    }
}
