//! # Exit Intent
//!
//! Shows a retention offer the first time the pointer leaves through the top
//! edge of the page. Fires at most once per latch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Name of the notification the theme raises when the offer is shown.
pub const EXIT_INTENT_EVENT: &str = "show:exit-intent";

/// Shows the exit-intent offer.
pub trait ExitIntentListener: Send + Sync {
    fn show_offer(&self);
}

impl<F> ExitIntentListener for F
where
    F: Fn() + Send + Sync,
{
    fn show_offer(&self) {
        self()
    }
}

/// One-shot exit-intent latch.
pub struct ExitIntent {
    fired: AtomicBool,
    listener: Arc<dyn ExitIntentListener>,
}

impl ExitIntent {
    pub fn new(listener: Arc<dyn ExitIntentListener>) -> Self {
        ExitIntent {
            fired: AtomicBool::new(false),
            listener,
        }
    }

    /// Handles a pointer-leave at vertical position `client_y`.
    ///
    /// Returns true only for the leave that fired the offer.
    pub fn on_pointer_leave(&self, client_y: f64) -> bool {
        if client_y > 0.0 {
            return false;
        }
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }

        info!(event = EXIT_INTENT_EVENT, client_y, "Exit intent detected");
        self.listener.show_offer();
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ExitIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitIntent")
            .field("fired", &self.has_fired())
            .finish()
    }
}
