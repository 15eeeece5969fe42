//! # Add-to-Cart Hook
//!
//! Runs after a product form has been accepted by the storefront: report the
//! add to analytics, then pull the new cart into the store.

use std::sync::Arc;

use storefront_cart::CartStore;
use tracing::debug;

use crate::analytics::{AnalyticsTracker, ProductSummary};

/// Reaction to a successful add-to-cart submission.
#[derive(Debug)]
pub struct AddToCartHook {
    store: Arc<CartStore>,
    tracker: Arc<AnalyticsTracker>,
}

impl AddToCartHook {
    pub fn new(store: Arc<CartStore>, tracker: Arc<AnalyticsTracker>) -> Self {
        AddToCartHook { store, tracker }
    }

    /// Tracks the add, then refreshes the store.
    ///
    /// A failed refresh is logged by the store and leaves the snapshot as it
    /// was; the analytics event is sent either way.
    pub async fn on_added(&self, product: &ProductSummary) {
        let tracked = self.tracker.track_add_to_cart(product);
        debug!(product_id = %product.product_id, tracked, "Product added to cart");
        self.store.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MemorySink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storefront_cart::{
        AnalyticsSettings, CartError, CartResult, CartService, RemoteCart, RemoteLineItem,
    };
    use storefront_core::Money;

    /// Each fetch returns one more unit of the same line.
    #[derive(Default)]
    struct GrowingCart {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CartService for GrowingCart {
        async fn fetch_cart(&self) -> CartResult<RemoteCart> {
            if self.fail {
                return Err(CartError::HttpStatus { status: 502 });
            }
            let quantity = self.calls.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            Ok(RemoteCart {
                item_count: quantity,
                items: vec![RemoteLineItem {
                    key: "1:a".to_string(),
                    id: 1,
                    product_id: 10,
                    title: "Mug".to_string(),
                    quantity,
                    price: 999,
                    line_price: 999 * quantity,
                    sku: None,
                    vendor: None,
                    url: None,
                }],
                items_subtotal_price: 999 * quantity,
                currency: None,
            })
        }
    }

    fn tracker() -> (Arc<AnalyticsTracker>, Arc<MemorySink>) {
        let settings = AnalyticsSettings {
            measurement_id: Some("G-TEST123".to_string()),
            ..Default::default()
        };
        let sink = Arc::new(MemorySink::new());
        (Arc::new(AnalyticsTracker::new(&settings, sink.clone())), sink)
    }

    fn mug() -> ProductSummary {
        ProductSummary {
            product_id: "10".to_string(),
            title: "Mug".to_string(),
            price: Money::from_cents(999),
        }
    }

    #[tokio::test]
    async fn test_tracks_then_refreshes() {
        let store = Arc::new(CartStore::new(Arc::new(GrowingCart::default())));
        let (tracker, sink) = tracker();
        let hook = AddToCartHook::new(store.clone(), tracker);

        hook.on_added(&mug()).await;
        assert_eq!(store.item_count(), 1);
        hook.on_added(&mug()).await;
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.subtotal(), Money::from_cents(1998));

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.target == "add_to_cart"));
    }

    #[tokio::test]
    async fn test_failed_refresh_still_tracks() {
        let service = GrowingCart {
            fail: true,
            ..Default::default()
        };
        let store = Arc::new(CartStore::new(Arc::new(service)));
        let (tracker, sink) = tracker();
        let hook = AddToCartHook::new(store.clone(), tracker);

        hook.on_added(&mug()).await;
        assert_eq!(store.item_count(), 0);
        assert!(store.last_error().is_some());
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_does_not_toggle_drawer() {
        let store = Arc::new(CartStore::new(Arc::new(GrowingCart::default())));
        let hook = AddToCartHook::new(store.clone(), Arc::new(AnalyticsTracker::disabled()));

        hook.on_added(&mug()).await;
        assert!(!store.is_open());
    }
}
