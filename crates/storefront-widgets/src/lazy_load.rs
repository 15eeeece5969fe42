//! # Lazy Images
//!
//! Deferred image loading and the critical-image preload hints.
//!
//! ## Image Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <img data-src="/p/mug.webp" class="lazy">                              │
//! │       │                                                                 │
//! │       ▼  observe(id, image)         no data-src ──► ignored             │
//! │  Pending ─────────────────────────────────────────────────────────┐     │
//! │       │                                                           │     │
//! │       ▼  on_intersect(id)                                         │     │
//! │  src = data-src, "lazy" class removed, image unobserved           │     │
//! │       │                                                           │     │
//! │       ▼  on_intersect(id) again ──► no-op (already loaded)        │     │
//! │  Loaded ◄─────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use storefront_cart::WidgetSettings;
use tracing::debug;

/// Class the theme puts on images that have not loaded yet.
pub const LAZY_CLASS: &str = "lazy";

// =============================================================================
// Images
// =============================================================================

/// The attributes of an `<img>` that lazy loading touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LazyImage {
    pub src: Option<String>,
    pub data_src: Option<String>,
    pub classes: BTreeSet<String>,
}

impl LazyImage {
    /// An image waiting on `data_src`, marked with the lazy class.
    pub fn deferred(data_src: &str) -> Self {
        LazyImage {
            src: None,
            data_src: Some(data_src.to_string()),
            classes: BTreeSet::from([LAZY_CLASS.to_string()]),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// The deferred source, if it names anything.
    fn pending_src(&self) -> Option<&str> {
        self.data_src.as_deref().filter(|src| !src.is_empty())
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Observes deferred images and loads each one on first intersection.
#[derive(Debug, Default)]
pub struct LazyImageLoader {
    observed: BTreeMap<String, LazyImage>,
    loaded: BTreeMap<String, LazyImage>,
}

impl LazyImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts observing `image` under `id`.
    ///
    /// Returns false, and keeps nothing, when the image has no deferred
    /// source or `id` is already known.
    pub fn observe(&mut self, id: &str, image: LazyImage) -> bool {
        if image.pending_src().is_none() {
            debug!(id, "Image has no data-src; not observing");
            return false;
        }
        if self.observed.contains_key(id) || self.loaded.contains_key(id) {
            return false;
        }

        self.observed.insert(id.to_string(), image);
        true
    }

    /// Handles an image scrolling into view.
    ///
    /// Swaps `data-src` into `src`, drops the lazy class and stops observing.
    /// Returns the loaded image only on the intersection that loaded it.
    pub fn on_intersect(&mut self, id: &str) -> Option<&LazyImage> {
        let mut image = self.observed.remove(id)?;

        image.src = image.pending_src().map(str::to_string);
        image.classes.remove(LAZY_CLASS);
        debug!(id, src = ?image.src, "Lazy image loaded");

        self.loaded.insert(id.to_string(), image);
        self.loaded.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.observed.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.observed.contains_key(id)
    }

    /// The image under `id`, loaded or not.
    pub fn image(&self, id: &str) -> Option<&LazyImage> {
        self.loaded.get(id).or_else(|| self.observed.get(id))
    }
}

// =============================================================================
// Preload Hints
// =============================================================================

/// A `<link rel="preload" as="image">` hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadLink {
    pub href: String,
}

impl PreloadLink {
    pub fn rel(&self) -> &'static str {
        "preload"
    }

    pub fn as_kind(&self) -> &'static str {
        "image"
    }
}

impl fmt::Display for PreloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<link rel="{}" as="{}" href="{}">"#,
            self.rel(),
            self.as_kind(),
            self.href.replace('&', "&amp;").replace('"', "&quot;")
        )
    }
}

/// Preload hints for the configured critical images, in order, without
/// duplicates.
pub fn critical_preloads(settings: &WidgetSettings) -> Vec<PreloadLink> {
    let mut seen = BTreeSet::new();
    settings
        .preload_images
        .iter()
        .filter(|href| seen.insert(href.as_str()))
        .map(|href| PreloadLink { href: href.clone() })
        .collect()
}
