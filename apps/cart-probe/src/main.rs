//! # cart-probe
//!
//! Inspects a storefront cart through the same store the theme widgets use.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  args + StorefrontConfig (defaults → TOML → env → --base-url)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartStore::from_config ──► initialize() ──► print snapshot JSON        │
//! │       │                                                                 │
//! │       ├── --toggle: CartDrawer attached, toggle(), print drawer view    │
//! │       │                                                                 │
//! │       └── --watch N: refresh every N seconds until Ctrl-C               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use storefront_cart::{CartStore, StorefrontConfig};
use storefront_widgets::{AnalyticsTracker, CartDrawer, TracingSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Storefront cart inspector
#[derive(Parser, Debug)]
#[command(name = "cart-probe")]
#[command(about = "Fetch and watch a storefront cart through the theme's cart store")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storefront base URL, overriding the config file
    #[arg(short, long)]
    base_url: Option<String>,

    /// Keep refreshing every N seconds
    #[arg(short, long, value_name = "SECS")]
    watch: Option<u64>,

    /// Toggle the drawer once and print what an attached drawer sees
    #[arg(long)]
    toggle: bool,
}

/// Initializes logging.
///
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_cart=trace` - Trace the store only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_config(args: &Args) -> Result<StorefrontConfig, Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::load(args.config.clone())?;
    if let Some(base_url) = &args.base_url {
        config.storefront.base_url = base_url.clone();
        config.validate()?;
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(&args)?;
    info!(
        url = %config.cart_url()?,
        ordering = %config.ordering(),
        "Configuration loaded"
    );

    let store = Arc::new(CartStore::from_config(&config)?);
    let tracker = AnalyticsTracker::new(&config.analytics, Arc::new(TracingSink));

    store.initialize().await;
    tracker.track_page_view("cart-probe", config.cart_url()?.as_str());
    if let Some(error) = store.last_error() {
        warn!(%error, "Initial refresh failed; showing empty cart");
    }
    print_json(&*store.snapshot())?;

    if args.toggle {
        let mut drawer = CartDrawer::attach(store.clone());
        store.toggle();
        info!(toggles_seen = drawer.toggles_seen(), "Drawer notified");
        print_json(&drawer.view())?;
        drawer.detach();
    }

    let Some(secs) = args.watch else {
        return Ok(());
    };

    let period = Duration::from_secs(secs.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;
    info!(every_secs = period.as_secs(), "Watching cart; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let before = store.applied_seq();
                store.refresh().await;
                if store.applied_seq() != before {
                    print_json(&*store.snapshot())?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                return Ok(());
            }
        }
    }
}
