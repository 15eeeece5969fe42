//! # Cart Events
//!
//! Explicit subscribe/unsubscribe notifications from the store to widgets.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore::toggle()                                                    │
//! │       │                                                                 │
//! │       ├── is_open flips                                                 │
//! │       ▼                                                                 │
//! │  ListenerRegistry::notify(CartEvent::Toggled)                           │
//! │       │                                                                 │
//! │       ├──► CartDrawer      (subscription 1)                             │
//! │       └──► badge widget    (subscription 2)                             │
//! │                                                                         │
//! │  Listeners run synchronously, in subscription order, after the flag    │
//! │  has flipped. They re-read the store for the current value.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

// =============================================================================
// Event Types
// =============================================================================

/// A cart state-change notification.
///
/// Events carry no payload; observers read what they need from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// The drawer visibility flag flipped.
    Toggled,
}

impl CartEvent {
    /// The event's name in the theme's `cart:*` namespace.
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::Toggled => "cart:toggle",
        }
    }
}

impl fmt::Display for CartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Listener Trait
// =============================================================================

/// Receives cart events.
///
/// Implemented for any `Fn(CartEvent) + Send + Sync` closure.
pub trait CartListener: Send + Sync {
    fn on_cart_event(&self, event: CartEvent);
}

impl<F> CartListener for F
where
    F: Fn(CartEvent) + Send + Sync,
{
    fn on_cart_event(&self, event: CartEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

// =============================================================================
// Listener Registry
// =============================================================================

/// The set of live subscriptions.
///
/// Ids increase monotonically, so the `BTreeMap` iterates in subscription
/// order. The map is cloned before notifying; a listener may subscribe,
/// unsubscribe or toggle again from inside its callback.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<SubscriptionId, Arc<dyn CartListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn CartListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        trace!(%id, "Listener subscribed");
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        trace!(%id, removed, "Listener unsubscribed");
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every current listener.
    pub fn notify(&self, event: CartEvent) {
        let listeners: Vec<Arc<dyn CartListener>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        trace!(%event, count = listeners.len(), "Notifying listeners");
        for listener in listeners {
            listener.on_cart_event(event);
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_event_name() {
        assert_eq!(CartEvent::Toggled.name(), "cart:toggle");
        assert_eq!(CartEvent::Toggled.to_string(), "cart:toggle");
    }

    #[test]
    fn test_notify_reaches_subscribers() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        registry.subscribe(Arc::new(move |_: CartEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(CartEvent::Toggled);
        registry.notify(CartEvent::Toggled);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_detaches() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = registry.subscribe(Arc::new(move |_: CartEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.notify(CartEvent::Toggled);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_notifies_in_subscription_order() {
        let registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let order = order.clone();
            registry.subscribe(Arc::new(move |_: CartEvent| {
                order.lock().unwrap().push(name);
            }));
        }

        registry.notify(CartEvent::Toggled);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let registry = Arc::new(ListenerRegistry::new());
        let own_id = Arc::new(Mutex::new(None::<SubscriptionId>));

        let reg = registry.clone();
        let slot = own_id.clone();
        let id = registry.subscribe(Arc::new(move |_: CartEvent| {
            if let Some(id) = *slot.lock().unwrap() {
                reg.unsubscribe(id);
            }
        }));
        *own_id.lock().unwrap() = Some(id);

        registry.notify(CartEvent::Toggled);
        assert!(registry.is_empty());
    }
}
