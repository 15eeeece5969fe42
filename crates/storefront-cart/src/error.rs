//! # Cart Error Types
//!
//! Error types for the cart store, its configuration and the remote service.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  MalformedResponse      │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Validation             │ │
//! │  │  ConfigLoad/Save│  │  HttpStatus     │  │                         │ │
//! │  │                 │  │  RequestFailed  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  refresh() recovers Transport and Response errors locally: they are    │
//! │  logged and the last good snapshot stays in place.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use storefront_core::CoreError;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart error type covering every failure the store can observe.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Invalid storefront URL.
    #[error("Invalid storefront URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the storefront.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request did not complete within the configured timeout.
    #[error("Cart request timed out after {0} seconds")]
    Timeout(u64),

    /// Storefront answered with a non-success status.
    #[error("Cart service returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Any other HTTP client failure.
    #[error("Cart request failed: {0}")]
    RequestFailed(String),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Body was not JSON or did not have the expected shape.
    #[error("Malformed cart response: {0}")]
    MalformedResponse(String),

    /// Body parsed but broke a cart rule (negative price, empty key, ...).
    #[error("Cart response rejected: {0}")]
    Validation(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for CartError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts are mapped by HttpCartService, which knows the configured limit.
        if err.is_connect() {
            CartError::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            CartError::HttpStatus {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            CartError::MalformedResponse(err.to_string())
        } else {
            CartError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for CartError {
    fn from(err: url::ParseError) -> Self {
        CartError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CartError {
    /// Returns true for failures reaching the storefront: network, timeout,
    /// non-2xx status.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CartError::ConnectionFailed(_)
                | CartError::Timeout(_)
                | CartError::HttpStatus { .. }
                | CartError::RequestFailed(_)
        )
    }

    /// Returns true when the storefront answered but the body was unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CartError::MalformedResponse(_) | CartError::Validation(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::InvalidUrl(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }
}
