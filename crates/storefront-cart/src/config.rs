//! # Storefront Configuration
//!
//! Configuration for the cart store, its remote service and the widgets.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_BASE_URL=https://shop.example.com                       │
//! │     STOREFRONT_REFRESH_ORDERING=sequenced                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront-theme/storefront.toml (Linux)                 │
//! │     ~/Library/Application Support/com.storefront.theme/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local theme dev server, /cart.js, sequenced refreshes              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storefront]
//! base_url = "https://shop.example.com"
//! cart_path = "/cart.js"
//! request_timeout_secs = 10
//! connect_timeout_secs = 5
//!
//! [cart]
//! ordering = "sequenced"  # sequenced | last_response_wins
//!
//! [analytics]
//! enabled = true
//! measurement_id = "G-XXXXXXX"
//! currency = "USD"
//!
//! [widgets]
//! countdown_tick_ms = 1000
//! preload_images = ["/assets/hero-image.webp", "/assets/logo.svg"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CartError, CartResult};

// =============================================================================
// Refresh Ordering
// =============================================================================

/// How the store treats refresh responses that arrive out of order.
///
/// ## Ordering Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  refresh A issued ──────────────────────────────► A resolves (100ms)   │
/// │      refresh B issued ──► B resolves (10ms)                             │
/// │                                                                         │
/// │  SEQUENCED (Default)                │  LAST_RESPONSE_WINS               │
/// │  ───────────────────                │  ──────────────────               │
/// │  B applied (seq 2)                  │  B applied                        │
/// │  A discarded: seq 1 < applied 2     │  A applied, overwriting B         │
/// │  Final: B's snapshot                │  Final: A's (older) snapshot      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOrdering {
    /// Apply a response only if it was issued after the applied one.
    #[default]
    Sequenced,

    /// Apply every successful response as it arrives.
    LastResponseWins,
}

impl std::fmt::Display for RefreshOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshOrdering::Sequenced => write!(f, "sequenced"),
            RefreshOrdering::LastResponseWins => write!(f, "last_response_wins"),
        }
    }
}

impl std::str::FromStr for RefreshOrdering {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequenced" | "ordered" => Ok(RefreshOrdering::Sequenced),
            "last_response_wins" | "last-response-wins" | "unordered" => {
                Ok(RefreshOrdering::LastResponseWins)
            }
            other => Err(CartError::InvalidConfig(format!(
                "Unknown refresh ordering: '{}'. Valid options: sequenced, last_response_wins",
                other
            ))),
        }
    }
}

// =============================================================================
// Storefront Settings
// =============================================================================

/// Where the remote Cart Service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontSettings {
    /// Storefront origin, e.g. `https://shop.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the cart JSON endpoint.
    #[serde(default = "default_cart_path")]
    pub cart_path: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    // Local theme dev server
    "http://127.0.0.1:9292".to_string()
}

fn default_cart_path() -> String {
    "/cart.js".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        StorefrontSettings {
            base_url: default_base_url(),
            cart_path: default_cart_path(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart store behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSettings {
    #[serde(default)]
    pub ordering: RefreshOrdering,
}

// =============================================================================
// Analytics Settings
// =============================================================================

/// Analytics tracking settings.
///
/// Tracking is a no-op unless `enabled` is set and a `measurement_id` exists,
/// the same way the theme skips tracking when the analytics global is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Analytics property id (e.g. `G-XXXXXXX`).
    #[serde(default)]
    pub measurement_id: Option<String>,

    /// Currency reported on e-commerce events.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        AnalyticsSettings {
            enabled: true,
            measurement_id: None,
            currency: default_currency(),
        }
    }
}

impl AnalyticsSettings {
    /// Returns the measurement id if tracking should happen at all.
    pub fn active_measurement_id(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.measurement_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

// =============================================================================
// Widget Settings
// =============================================================================

/// Settings for the conversion widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Countdown re-render interval (milliseconds).
    #[serde(default = "default_countdown_tick")]
    pub countdown_tick_ms: u64,

    /// Above-the-fold images emitted as `<link rel="preload">` hints.
    #[serde(default = "default_preload_images")]
    pub preload_images: Vec<String>,
}

fn default_countdown_tick() -> u64 {
    1000
}

fn default_preload_images() -> Vec<String> {
    vec![
        "/assets/hero-image.webp".to_string(),
        "/assets/logo.svg".to_string(),
    ]
}

impl Default for WidgetSettings {
    fn default() -> Self {
        WidgetSettings {
            countdown_tick_ms: default_countdown_tick(),
            preload_images: default_preload_images(),
        }
    }
}

impl WidgetSettings {
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Remote Cart Service location and timeouts.
    #[serde(default)]
    pub storefront: StorefrontSettings,

    /// Cart store behavior.
    #[serde(default)]
    pub cart: CartSettings,

    /// Analytics tracking.
    #[serde(default)]
    pub analytics: AnalyticsSettings,

    /// Conversion widgets.
    #[serde(default)]
    pub widgets: WidgetSettings,
}

impl StorefrontConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> CartResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        let base = Url::parse(&self.storefront.base_url)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(CartError::InvalidUrl(format!(
                "Storefront URL must start with http:// or https://, got: {}",
                self.storefront.base_url
            )));
        }

        let cart_path = &self.storefront.cart_path;
        if !cart_path.starts_with('/') {
            return Err(CartError::InvalidConfig(format!(
                "cart_path must start with '/', got: {}",
                cart_path
            )));
        }

        // `//host/..` (and `/\host` for http URLs) would replace the host on join.
        if cart_path.starts_with("//") || cart_path.starts_with("/\\") {
            return Err(CartError::InvalidConfig(format!(
                "cart_path must be a path on the storefront host, got: {}",
                cart_path
            )));
        }

        if self.storefront.request_timeout_secs == 0 || self.storefront.connect_timeout_secs == 0 {
            return Err(CartError::InvalidConfig(
                "timeouts must be greater than 0".into(),
            ));
        }

        if self.widgets.countdown_tick_ms == 0 {
            return Err(CartError::InvalidConfig(
                "countdown_tick_ms must be greater than 0".into(),
            ));
        }

        if let Some(href) = self.widgets.preload_images.iter().find(|h| h.trim().is_empty()) {
            return Err(CartError::InvalidConfig(format!(
                "preload_images entries must not be blank, got: {:?}",
                href
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STOREFRONT_BASE_URL") {
            debug!(url = %url, "Overriding storefront URL from environment");
            self.storefront.base_url = url;
        }

        if let Some(path) = lookup("STOREFRONT_CART_PATH") {
            self.storefront.cart_path = path;
        }

        if let Some(secs) = lookup("STOREFRONT_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.storefront.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Invalid request timeout in environment"),
            }
        }

        if let Some(ordering) = lookup("STOREFRONT_REFRESH_ORDERING") {
            match ordering.parse() {
                Ok(parsed) => {
                    debug!(ordering = %ordering, "Overriding refresh ordering from environment");
                    self.cart.ordering = parsed;
                }
                Err(_) => warn!(ordering = %ordering, "Unknown refresh ordering in environment"),
            }
        }

        if let Some(id) = lookup("STOREFRONT_MEASUREMENT_ID") {
            self.analytics.measurement_id = Some(id);
        }

        if let Some(enabled) = lookup("STOREFRONT_ANALYTICS_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.analytics.enabled = true,
                "0" | "false" | "no" => self.analytics.enabled = false,
                _ => warn!(value = %enabled, "Invalid analytics flag in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "theme")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Full URL of the cart endpoint.
    pub fn cart_url(&self) -> CartResult<Url> {
        let base = Url::parse(&self.storefront.base_url)?;
        Ok(base.join(&self.storefront.cart_path)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.storefront.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.storefront.connect_timeout_secs)
    }

    /// Returns the refresh ordering policy.
    pub fn ordering(&self) -> RefreshOrdering {
        self.cart.ordering
    }
}
