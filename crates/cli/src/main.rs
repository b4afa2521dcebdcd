//! Storecart CLI - drive the cart controller from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the local cart
//! storecart show
//!
//! # Add two widgets at $10.00
//! storecart add 1 "Widget" 10.00 --quantity 2
//!
//! # Push the local cart to the server (needs STORECART_SESSION_COOKIE)
//! storecart sync
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart and its order summary
//! - `add` / `remove` / `set` - Change cart lines
//! - `increase` / `decrease` - Quantity stepper buttons
//! - `clear` - Empty the cart
//! - `sync` - Replace the server cart with the local cart
//! - `remote` - Print the server's copy of the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use storecart_core::{Price, ProductId};
use storecart_storefront::{QuantityStep, StorecartConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::cart::CartCommand;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "storecart")]
#[command(author, version, about = "Storecart shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart and its order summary
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: ProductId,

        /// Display name
        name: String,

        /// Unit price, e.g. 10.00
        price: Price,

        /// Product image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(..=i64::from(u32::MAX)),
        )]
        quantity: i64,
    },
    /// Increase a line's quantity by one
    Increase {
        /// Product ID
        product_id: ProductId,
    },
    /// Decrease a line's quantity by one (never below one)
    Decrease {
        /// Product ID
        product_id: ProductId,
    },
    /// Empty the cart
    Clear,
    /// Replace the server cart with the local cart
    Sync,
    /// Print the server's copy of the cart
    Remote,
}

impl From<Commands> for CartCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add {
                product_id,
                name,
                price,
                image,
                quantity,
            } => Self::Add {
                product_id,
                name,
                price,
                image_url: image,
                quantity,
            },
            Commands::Remove { product_id } => Self::Remove(product_id),
            Commands::Set {
                product_id,
                quantity,
            } => Self::Set(product_id, quantity),
            Commands::Increase { product_id } => Self::Step(product_id, QuantityStep::Increase),
            Commands::Decrease { product_id } => Self::Step(product_id, QuantityStep::Decrease),
            Commands::Clear => Self::Clear,
            Commands::Sync => Self::Sync,
            Commands::Remote => Self::Remote,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorecartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[allow(clippy::print_stderr)]
fn load_config() -> StorecartConfig {
    match StorecartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storecart_storefront=warn,storecart_cli=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = commands::cart::run(&config, cli.command.into()).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "storecart", "add", "7", "Blue Mug", "12.50", "--quantity", "3",
        ])
        .unwrap();
        match CartCommand::from(cli.command) {
            CartCommand::Add {
                product_id,
                name,
                price,
                image_url,
                quantity,
            } => {
                assert_eq!(product_id, ProductId::new(7));
                assert_eq!(name, "Blue Mug");
                assert_eq!(price, Price::from_cents(1250).unwrap());
                assert!(image_url.is_empty());
                assert_eq!(quantity, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_negative_set() {
        let cli = Cli::try_parse_from(["storecart", "set", "4", "-2"]).unwrap();
        assert!(matches!(
            CartCommand::from(cli.command),
            CartCommand::Set(id, -2) if id == ProductId::new(4)
        ));
    }

    #[test]
    fn test_cli_rejects_oversized_quantity() {
        assert!(Cli::try_parse_from(["storecart", "set", "4", "5000000000"]).is_err());
        assert!(Cli::try_parse_from(["storecart", "add", "1", "Mug", "3", "-q", "5000000000"]).is_err());
        assert!(Cli::try_parse_from(["storecart", "set", "4", "4294967295"]).is_ok());
    }

    #[test]
    fn test_cli_maps_stepper() {
        let cli = Cli::try_parse_from(["storecart", "decrease", "9"]).unwrap();
        assert!(matches!(
            CartCommand::from(cli.command),
            CartCommand::Step(_, QuantityStep::Decrease)
        ));
    }

    #[test]
    fn test_cli_rejects_bad_price() {
        assert!(Cli::try_parse_from(["storecart", "add", "1", "Mug", "-3"]).is_err());
    }
}
