//! # Cart Service
//!
//! The seam between the store and the storefront's remote cart endpoint.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore::refresh()                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartService::fetch_cart()  ◄── trait: HTTP in production,             │
//! │       │                         scripted fakes in tests                 │
//! │       ▼                                                                 │
//! │  GET {base_url}/cart.js   Accept: application/json                      │
//! │       │                                                                 │
//! │       ├── connect error / timeout ──► ConnectionFailed / Timeout        │
//! │       ├── non-2xx ──────────────────► HttpStatus { status }             │
//! │       ├── bad body ─────────────────► MalformedResponse                 │
//! │       ▼                                                                 │
//! │  RemoteCart  (validated into CartSnapshot by the store)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{CartError, CartResult};
use crate::protocol::RemoteCart;

// =============================================================================
// Service Trait
// =============================================================================

/// A source of cart snapshots.
///
/// Session context (cookies, storefront tokens) is the implementation's
/// business; the store only asks for "the current cart".
#[async_trait]
pub trait CartService: Send + Sync {
    /// Fetches the current cart.
    async fn fetch_cart(&self) -> CartResult<RemoteCart>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// Fetches the cart from a storefront over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: Client,
    cart_url: Url,
    request_timeout_secs: u64,
}

impl HttpCartService {
    /// Builds a client from the storefront settings.
    ///
    /// A cookie store is enabled so the storefront's cart cookie set on the
    /// first response is sent on every later refresh.
    pub fn new(config: &StorefrontConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| CartError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(
            client,
            config.cart_url()?,
            config.storefront.request_timeout_secs,
        ))
    }

    /// Wraps an existing client, for callers that share one across services.
    pub fn with_client(client: Client, cart_url: Url, request_timeout_secs: u64) -> Self {
        HttpCartService {
            client,
            cart_url,
            request_timeout_secs,
        }
    }

    /// The endpoint this service fetches.
    pub fn cart_url(&self) -> &Url {
        &self.cart_url
    }

    fn classify(&self, err: reqwest::Error) -> CartError {
        if err.is_timeout() {
            CartError::Timeout(self.request_timeout_secs)
        } else {
            CartError::from(err)
        }
    }
}

#[async_trait]
impl CartService for HttpCartService {
    #[instrument(skip(self), fields(url = %self.cart_url))]
    async fn fetch_cart(&self) -> CartResult<RemoteCart> {
        let response = self
            .client
            .get(self.cart_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CartError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(bytes = body.len(), "Cart response received");

        RemoteCart::from_slice(&body)
    }
}
