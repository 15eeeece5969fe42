//! # Cart Drawer
//!
//! The slide-out cart panel. It subscribes to the store when attached and
//! re-reads the store whenever it renders, so it never holds stale state.
//!
//! ## Lifecycle
//! ```text
//! CartDrawer::attach(store) ── subscribe ──► ListenerRegistry
//!        │
//!        │  CartEvent::Toggled  ──► toggles_seen += 1
//!        │
//!        ├── view() ──► DrawerView { is_open, badge_count, subtotal, lines }
//!        │
//! detach() / drop ── unsubscribe
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use storefront_cart::{CartEvent, CartStore, SubscriptionId};
use tracing::debug;

/// A rendered line in the drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerLine {
    pub key: String,
    pub title: String,
    pub quantity: u32,
    pub line_price: String,
}

/// What the drawer shows at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerView {
    pub is_open: bool,
    pub badge_count: u32,
    pub subtotal: String,
    pub lines: Vec<DrawerLine>,
}

/// Cart drawer bound to a store.
pub struct CartDrawer {
    store: Arc<CartStore>,
    subscription: Option<SubscriptionId>,
    toggles_seen: Arc<AtomicU64>,
}

impl CartDrawer {
    /// Subscribes a new drawer to `store`.
    pub fn attach(store: Arc<CartStore>) -> Self {
        let toggles_seen = Arc::new(AtomicU64::new(0));
        let counter = toggles_seen.clone();
        let subscription = store.subscribe(Arc::new(move |event: CartEvent| {
            if event == CartEvent::Toggled {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));
        debug!(%subscription, "Cart drawer attached");

        CartDrawer {
            store,
            subscription: Some(subscription),
            toggles_seen,
        }
    }

    /// Unsubscribes. Safe to call more than once.
    pub fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
            debug!(subscription = %id, "Cart drawer detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of toggle notifications received while attached.
    pub fn toggles_seen(&self) -> u64 {
        self.toggles_seen.load(Ordering::SeqCst)
    }

    /// Renders from the store's current state.
    pub fn view(&self) -> DrawerView {
        let snapshot = self.store.snapshot();
        let currency = snapshot.currency.as_deref();

        DrawerView {
            is_open: self.store.is_open(),
            badge_count: snapshot.item_count,
            subtotal: snapshot.subtotal.format_with_currency(currency),
            lines: snapshot
                .items
                .iter()
                .map(|item| DrawerLine {
                    key: item.key.clone(),
                    title: item.title.clone(),
                    quantity: item.quantity,
                    line_price: item.line_price.format_with_currency(currency),
                })
                .collect(),
        }
    }
}

impl Drop for CartDrawer {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storefront_cart::{CartResult, CartService, RemoteCart, RemoteLineItem};

    struct FixedCart;

    #[async_trait]
    impl CartService for FixedCart {
        async fn fetch_cart(&self) -> CartResult<RemoteCart> {
            Ok(RemoteCart {
                item_count: 3,
                items: vec![
                    RemoteLineItem {
                        key: "1:a".to_string(),
                        id: 1,
                        product_id: 10,
                        title: "Mug".to_string(),
                        quantity: 1,
                        price: 999,
                        line_price: 999,
                        sku: None,
                        vendor: None,
                        url: None,
                    },
                    RemoteLineItem {
                        key: "2:b".to_string(),
                        id: 2,
                        product_id: 20,
                        title: "Tee".to_string(),
                        quantity: 2,
                        price: 1800,
                        line_price: 3600,
                        sku: None,
                        vendor: None,
                        url: None,
                    },
                ],
                items_subtotal_price: 4599,
                currency: Some("USD".to_string()),
            })
        }
    }

    fn store() -> Arc<CartStore> {
        Arc::new(CartStore::new(Arc::new(FixedCart)))
    }

    #[test]
    fn test_counts_toggles_and_reads_flag() {
        let store = store();
        let drawer = CartDrawer::attach(store.clone());

        store.toggle();
        assert_eq!(drawer.toggles_seen(), 1);
        assert!(drawer.view().is_open);

        store.toggle();
        assert_eq!(drawer.toggles_seen(), 2);
        assert!(!drawer.view().is_open);
    }

    #[tokio::test]
    async fn test_view_reflects_snapshot() {
        let store = store();
        let drawer = CartDrawer::attach(store.clone());
        assert_eq!(drawer.view().badge_count, 0);
        assert_eq!(drawer.view().subtotal, "0.00");

        store.refresh().await;
        let view = drawer.view();
        assert_eq!(view.badge_count, 3);
        assert_eq!(view.subtotal, "45.99 USD");
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[1].title, "Tee");
        assert_eq!(view.lines[1].line_price, "36.00 USD");
        // Refresh does not notify
        assert_eq!(drawer.toggles_seen(), 0);
    }

    #[test]
    fn test_detach_unsubscribes() {
        let store = store();
        let mut drawer = CartDrawer::attach(store.clone());
        assert_eq!(store.subscriber_count(), 1);

        drawer.detach();
        drawer.detach();
        assert!(!drawer.is_attached());
        assert_eq!(store.subscriber_count(), 0);

        store.toggle();
        assert_eq!(drawer.toggles_seen(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = store();
        {
            let _drawer = CartDrawer::attach(store.clone());
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }
}
