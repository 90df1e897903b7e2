//! # Cart Quote Tool
//!
//! Prices a cart file against the configured store-wide sales.
//!
//! ## Usage
//! ```bash
//! # Store-wide sales only
//! cargo run -p fruit-billing --bin quote -- --cart ./cart.json
//!
//! # Include a user's personal discount from Redis
//! cargo run -p fruit-billing --bin quote -- --cart ./cart.json \
//!     --user 550e8400-e29b-41d4-a716-446655440000
//!
//! # Explicit config file
//! cargo run -p fruit-billing --bin quote -- --config ./fruit.toml --cart ./cart.json
//! ```
//!
//! ## Cart File
//! ```json
//! [
//!   { "name": "Pears",   "unitPrice": 1000, "quantity": 4 },
//!   { "name": "Bananas", "unitPrice": 1000, "quantity": 2 }
//! ]
//! ```
//! Prices are in cents.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use fruit_billing::{logging, BillingConfig, DiscountManager, SalesCatalog};
use fruit_cache::{InMemoryStore, KeyValueStore, RedisStore};
use fruit_core::CartLine;
use tracing::info;
use uuid::Uuid;

struct Args {
    config: Option<PathBuf>,
    cart: PathBuf,
    user: Option<Uuid>,
}

fn print_help() {
    println!("Fruit Store Cart Quote");
    println!();
    println!("Usage: quote --cart <PATH> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --cart <PATH>     Cart JSON file (required)");
    println!("  -u, --user <UUID>     Include this user's personal discount (needs Redis)");
    println!("      --config <PATH>   Config file (default: $FRUIT_CONFIG or ./fruit.toml)");
    println!("  -h, --help            Show this help message");
}

/// `Ok(None)` when help was printed.
fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = env::args().collect();

    let mut config = None;
    let mut cart = None;
    let mut user = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" => {
                config = Some(PathBuf::from(value.context("--config needs a path")?));
                i += 1;
            }
            "--cart" | "-c" => {
                cart = Some(PathBuf::from(value.context("--cart needs a path")?));
                i += 1;
            }
            "--user" | "-u" => {
                let raw = value.context("--user needs a UUID")?;
                user = Some(Uuid::parse_str(raw).with_context(|| format!("invalid user id '{}'", raw))?);
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            other => bail!("unknown argument '{}', see --help", other),
        }
        i += 1;
    }

    let Some(cart) = cart else {
        bail!("--cart is required, see --help");
    };
    Ok(Some(Args { config, cart, user }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    // No subscriber yet: load reports problems as errors
    let config = BillingConfig::load(args.config.as_deref())?;
    logging::init(&config.logging)?;
    info!(
        sales = config.sales.len(),
        ttl_secs = config.discount.ttl_secs,
        lookup_policy = %config.discount.lookup_policy,
        log_level = %config.logging.level,
        "Billing configuration loaded"
    );

    let contents = std::fs::read_to_string(&args.cart)
        .with_context(|| format!("failed to read cart file {}", args.cart.display()))?;
    let lines: Vec<CartLine> = serde_json::from_str(&contents).context("cart file is not a list of cart lines")?;

    // Without a user there is no personal discount to read, so Redis is optional
    let (store, user_id): (Arc<dyn KeyValueStore>, Uuid) = match args.user {
        Some(user_id) => (Arc::new(RedisStore::connect(&config.redis.url).await?), user_id),
        None => (Arc::new(InMemoryStore::new()), Uuid::nil()),
    };

    let catalog = SalesCatalog::new(config.sales.clone())?;
    info!(sales = catalog.len(), lines = lines.len(), "Pricing cart");

    let discounts = DiscountManager::new(store, catalog, &config.discount);
    let totals = discounts.compute_total(user_id, &lines).await?;

    println!("{}", serde_json::to_string_pretty(&totals)?);
    Ok(())
}
