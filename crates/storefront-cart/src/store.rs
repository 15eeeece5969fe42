//! # Cart Store
//!
//! The cached view of the shopper's remote cart, shared with every widget.
//!
//! ## State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CartStore                                      │
//! │                                                                         │
//! │  ┌───────────────────────────────┐   ┌───────────────────────────────┐ │
//! │  │ snapshot axis                 │   │ drawer axis                   │ │
//! │  │                               │   │                               │ │
//! │  │ RwLock<(applied_seq,          │   │ AtomicBool is_open            │ │
//! │  │         Arc<CartSnapshot>)>   │   │ closed ⇄ open                 │ │
//! │  │                               │   │                               │ │
//! │  │ replaced only by a successful │   │ flipped only by toggle(),     │ │
//! │  │ refresh(), one pointer swap   │   │ then CartEvent::Toggled       │ │
//! │  └───────────────────────────────┘   └───────────────────────────────┘ │
//! │                                                                         │
//! │  The two axes are independent; neither operation touches the other.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Refresh Lifecycle
//! ```text
//! refresh()
//!    │  seq = next_seq++            (taken before the request is issued)
//!    ▼
//! CartService::fetch_cart().await   (the only suspension point)
//!    │
//!    ├── Err ──► error! log, last_error set, state untouched
//!    ▼
//! RemoteCart::into_snapshot()       (schema validation)
//!    │
//!    ├── Err ──► same as above
//!    ▼
//! write lock ─► Sequenced:        apply if seq > applied_seq, else Superseded
//!               LastResponseWins: apply unconditionally
//! ```
//!
//! No lock is held across the `.await`, so readers never block on the
//! network and never observe a half-built snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use storefront_core::{CartSnapshot, Money};
use tracing::{debug, error, info, warn};

use crate::config::{RefreshOrdering, StorefrontConfig};
use crate::error::CartResult;
use crate::events::{CartEvent, CartListener, ListenerRegistry, SubscriptionId};
use crate::service::{CartService, HttpCartService};

// =============================================================================
// Refresh Outcome
// =============================================================================

/// What a successful fetch did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the snapshot.
    Applied { seq: u64 },

    /// A newer response had already been applied; this one was dropped.
    Superseded { seq: u64, applied: u64 },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug)]
struct AppliedSnapshot {
    /// Sequence number of the refresh that produced `snapshot` (0 = initial).
    seq: u64,
    snapshot: Arc<CartSnapshot>,
}

/// Decrements the in-flight counter even if the refresh future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Client-side cart store.
///
/// Construct one per application context and share it as `Arc<CartStore>`.
///
/// ## Usage
/// ```rust,ignore
/// let store = Arc::new(CartStore::from_config(&config)?);
/// store.initialize().await;
///
/// let drawer = CartDrawer::attach(store.clone());
/// store.toggle();                 // drawer hears CartEvent::Toggled
/// println!("{} items", store.item_count());
/// ```
pub struct CartStore {
    service: Arc<dyn CartService>,
    ordering: RefreshOrdering,
    state: RwLock<AppliedSnapshot>,
    is_open: AtomicBool,
    next_seq: AtomicU64,
    in_flight: AtomicUsize,
    initialized: AtomicBool,
    last_error: Mutex<Option<String>>,
    listeners: ListenerRegistry,
}

impl CartStore {
    /// Creates a store with sequenced refreshes and an empty snapshot.
    pub fn new(service: Arc<dyn CartService>) -> Self {
        Self::with_ordering(service, RefreshOrdering::default())
    }

    /// Creates a store with an explicit ordering policy.
    pub fn with_ordering(service: Arc<dyn CartService>, ordering: RefreshOrdering) -> Self {
        CartStore {
            service,
            ordering,
            state: RwLock::new(AppliedSnapshot {
                seq: 0,
                snapshot: Arc::new(CartSnapshot::empty()),
            }),
            is_open: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            initialized: AtomicBool::new(false),
            last_error: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Creates a store backed by [`HttpCartService`].
    pub fn from_config(config: &StorefrontConfig) -> CartResult<Self> {
        let service = HttpCartService::new(config)?;
        info!(
            url = %service.cart_url(),
            ordering = %config.ordering(),
            "Cart store configured"
        );
        Ok(Self::with_ordering(Arc::new(service), config.ordering()))
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Runs the initial refresh.
    ///
    /// Never fails: if the first fetch fails the store keeps its empty
    /// snapshot and stays usable. Only the first call does anything.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("Cart store already initialized; ignoring");
            return;
        }

        debug!("Initializing cart store");
        self.refresh().await;
    }

    /// Fetches the cart and replaces the snapshot on success.
    ///
    /// Failures are logged and swallowed; the previous snapshot stays in
    /// place. Use [`CartStore::try_refresh`] to see what happened.
    pub async fn refresh(&self) {
        if let Err(e) = self.try_refresh().await {
            error!(
                error = %e,
                transport = e.is_transport(),
                malformed = e.is_malformed(),
                "Failed to refresh cart"
            );
        }
    }

    /// Same as [`CartStore::refresh`], but reports the outcome.
    ///
    /// On `Err` the snapshot and `is_open` are unchanged.
    pub async fn try_refresh(&self) -> CartResult<RefreshOutcome> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!(seq, "Cart refresh issued");

        let fetched = match self.service.fetch_cart().await {
            Ok(remote) => remote.into_snapshot(),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(snapshot) => {
                self.set_last_error(None);
                Ok(self.apply(seq, snapshot))
            }
            Err(e) => {
                self.set_last_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Flips the drawer flag and notifies subscribers exactly once.
    ///
    /// Returns the new value.
    pub fn toggle(&self) -> bool {
        let is_open = !self.is_open.fetch_xor(true, Ordering::SeqCst);
        debug!(is_open, "Cart drawer toggled");
        self.listeners.notify(CartEvent::Toggled);
        is_open
    }

    fn apply(&self, seq: u64, snapshot: CartSnapshot) -> RefreshOutcome {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if self.ordering == RefreshOrdering::Sequenced && seq <= state.seq {
            debug!(seq, applied = state.seq, "Discarding superseded cart response");
            return RefreshOutcome::Superseded {
                seq,
                applied: state.seq,
            };
        }

        debug!(
            seq,
            item_count = snapshot.item_count,
            lines = snapshot.line_count(),
            subtotal = snapshot.subtotal.cents(),
            "Cart snapshot applied"
        );
        *state = AppliedSnapshot {
            seq,
            snapshot: Arc::new(snapshot),
        };
        RefreshOutcome::Applied { seq }
    }

    fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// Whether the cart drawer is open.
    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> u32 {
        self.snapshot().item_count
    }

    pub fn subtotal(&self) -> Money {
        self.snapshot().subtotal
    }

    /// True while at least one refresh is waiting on the service.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Message of the most recent failed refresh, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sequence number of the refresh behind the current snapshot.
    pub fn applied_seq(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).seq
    }

    pub fn ordering(&self) -> RefreshOrdering {
        self.ordering
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a listener for cart events.
    pub fn subscribe(&self, listener: Arc<dyn CartListener>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Detaches a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("ordering", &self.ordering)
            .field("applied_seq", &self.applied_seq())
            .field("is_open", &self.is_open())
            .field("is_loading", &self.is_loading())
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::protocol::fixtures::{remote_cart, remote_line};
    use crate::protocol::RemoteCart;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Returns scripted responses in call order, each after its own delay.
    struct ScriptedService {
        script: Mutex<VecDeque<(Duration, CartResult<RemoteCart>)>>,
    }

    impl ScriptedService {
        fn new(script: Vec<(Duration, CartResult<RemoteCart>)>) -> Arc<Self> {
            Arc::new(ScriptedService {
                script: Mutex::new(script.into()),
            })
        }

        fn immediate(responses: Vec<CartResult<RemoteCart>>) -> Arc<Self> {
            Self::new(responses.into_iter().map(|r| (Duration::ZERO, r)).collect())
        }
    }

    #[async_trait]
    impl CartService for ScriptedService {
        async fn fetch_cart(&self) -> CartResult<RemoteCart> {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some((delay, response)) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    response
                }
                None => Err(CartError::ConnectionFailed("script exhausted".into())),
            }
        }
    }

    fn three_items() -> RemoteCart {
        RemoteCart {
            item_count: 3,
            items: vec![remote_line("a", 1, 1000), remote_line("b", 2, 1799)],
            items_subtotal_price: 4599,
            currency: Some("USD".to_string()),
        }
    }

    fn counting_listener(store: &CartStore) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        store.subscribe(Arc::new(move |_: CartEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        hits
    }

    #[test]
    fn test_initial_state() {
        let store = CartStore::new(ScriptedService::immediate(Vec::new()));
        assert_eq!(*store.snapshot(), CartSnapshot::empty());
        assert!(!store.is_open());
        assert!(!store.is_loading());
        assert_eq!(store.applied_seq(), 0);
        assert_eq!(store.ordering(), RefreshOrdering::Sequenced);
    }

    #[tokio::test]
    async fn test_refresh_applies_remote_cart() {
        let store = CartStore::new(ScriptedService::immediate(vec![Ok(three_items())]));

        store.refresh().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.item_count, 3);
        assert_eq!(snapshot.subtotal, Money::from_cents(4599));
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.subtotal().cents(), 4599);
    }

    #[tokio::test]
    async fn test_item_count_matches_quantities_across_refreshes() {
        let responses = vec![
            Ok(remote_cart(vec![remote_line("a", 1, 500)], 500)),
            Ok(remote_cart(
                vec![remote_line("a", 2, 500), remote_line("b", 3, 250)],
                1750,
            )),
            Ok(remote_cart(Vec::new(), 0)),
            Ok(remote_cart(vec![remote_line("c", 9, 100)], 900)),
        ];
        let count = responses.len();
        let store = CartStore::new(ScriptedService::immediate(responses));

        for _ in 0..count {
            store.refresh().await;
            let snapshot = store.snapshot();
            assert_eq!(u64::from(snapshot.item_count), snapshot.quantity_total());
        }
        assert_eq!(store.item_count(), 9);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let store = CartStore::new(ScriptedService::immediate(vec![
            Ok(three_items()),
            Ok(remote_cart(Vec::new(), 0)),
        ]));

        store.initialize().await;
        store.initialize().await;

        // Second call was ignored, so the empty cart was never fetched.
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.applied_seq(), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_keeps_empty_snapshot() {
        let store = CartStore::new(ScriptedService::immediate(vec![
            Err(CartError::ConnectionFailed("offline".into())),
            Ok(three_items()),
        ]));

        store.initialize().await;
        assert_eq!(*store.snapshot(), CartSnapshot::empty());
        assert!(store.last_error().is_some());

        // Still usable afterwards
        store.refresh().await;
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_state_unchanged() {
        let failures = vec![
            Err(CartError::ConnectionFailed("network unreachable".into())),
            Err(CartError::HttpStatus { status: 500 }),
            Err(CartError::MalformedResponse("expected value".into())),
            // Well-formed JSON that fails validation
            Ok(remote_cart(vec![remote_line("a", 0, 100)], 0)),
        ];
        let mut script = vec![Ok(three_items())];
        script.extend(failures);
        let store = CartStore::new(ScriptedService::immediate(script));

        store.refresh().await;
        store.toggle();
        let before = store.snapshot();
        let before_json = serde_json::to_vec(&*before).unwrap();

        for _ in 0..4 {
            let result = store.try_refresh().await;
            assert!(result.is_err());

            let after = store.snapshot();
            assert!(Arc::ptr_eq(&before, &after));
            assert_eq!(serde_json::to_vec(&*after).unwrap(), before_json);
            assert!(store.is_open());
        }
        assert_eq!(store.applied_seq(), 1);
    }

    #[tokio::test]
    async fn test_refresh_does_not_touch_is_open() {
        let store = CartStore::new(ScriptedService::immediate(vec![Ok(three_items())]));
        store.toggle();
        store.refresh().await;
        assert!(store.is_open());
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let store = CartStore::new(ScriptedService::immediate(Vec::new()));
        let initial = store.is_open();

        assert!(store.toggle());
        assert!(!store.toggle());
        assert_eq!(store.is_open(), initial);
    }

    #[tokio::test]
    async fn test_toggle_notifies_once_refresh_never() {
        let store = CartStore::new(ScriptedService::immediate(vec![
            Ok(three_items()),
            Err(CartError::Timeout(10)),
        ]));
        let hits = counting_listener(&store);

        store.toggle();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        store.toggle();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        store.refresh().await;
        store.refresh().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_sees_flipped_flag() {
        let store = Arc::new(CartStore::new(ScriptedService::immediate(Vec::new())));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = store.clone();
        let log = seen.clone();
        store.subscribe(Arc::new(move |event: CartEvent| {
            log.lock().unwrap().push((event, reader.is_open()));
        }));

        store.toggle();
        store.toggle();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(CartEvent::Toggled, true), (CartEvent::Toggled, false)]
        );
    }

    #[test]
    fn test_unsubscribed_listener_is_silent() {
        let store = CartStore::new(ScriptedService::immediate(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = store.subscribe(Arc::new(move |_: CartEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.toggle();
        assert!(store.unsubscribe(id));
        assert_eq!(store.subscriber_count(), 0);
        store.toggle();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// Refresh A resolves S1 after 100ms; refresh B, issued after A, resolves
    /// S2 after 10ms.
    fn race_script() -> (Arc<ScriptedService>, RemoteCart, RemoteCart) {
        let s1 = remote_cart(vec![remote_line("old", 1, 100)], 100);
        let s2 = remote_cart(vec![remote_line("new", 2, 100)], 200);
        let service = ScriptedService::new(vec![
            (Duration::from_millis(100), Ok(s1.clone())),
            (Duration::from_millis(10), Ok(s2.clone())),
        ]);
        (service, s1, s2)
    }

    async fn race(store: &CartStore) -> (RefreshOutcome, RefreshOutcome) {
        let (a, b) = tokio::join!(store.try_refresh(), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            store.try_refresh().await
        });
        (a.unwrap(), b.unwrap())
    }

    /// Documents the last-response-wins hazard: the older response lands
    /// last and overwrites the newer snapshot.
    #[tokio::test(start_paused = true)]
    async fn test_last_response_wins_keeps_older_snapshot() {
        let (service, s1, _s2) = race_script();
        let store = CartStore::with_ordering(service, RefreshOrdering::LastResponseWins);

        let (a, b) = race(&store).await;

        assert_eq!(b, RefreshOutcome::Applied { seq: 2 });
        assert_eq!(a, RefreshOutcome::Applied { seq: 1 });
        assert_eq!(*store.snapshot(), s1.into_snapshot().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequenced_discards_superseded_response() {
        let (service, _s1, s2) = race_script();
        let store = CartStore::new(service);

        let (a, b) = race(&store).await;

        assert_eq!(b, RefreshOutcome::Applied { seq: 2 });
        assert_eq!(a, RefreshOutcome::Superseded { seq: 1, applied: 2 });
        assert_eq!(*store.snapshot(), s2.into_snapshot().unwrap());
        assert_eq!(store.applied_seq(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_loading_while_in_flight() {
        let service = ScriptedService::new(vec![(Duration::from_millis(50), Ok(three_items()))]);
        let store = Arc::new(CartStore::new(service));

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_loading());

        task.await.unwrap();
        assert!(!store.is_loading());
        assert_eq!(store.item_count(), 3);
    }
}
