//! # vitrine
//!
//! Command-line host for the Vitrine cart.
//!
//! Commands:
//! - `vitrine show` - Print the current cart
//! - `vitrine add` - Add a product (merges into a matching line)
//! - `vitrine remove` - Remove every line of a product
//! - `vitrine set-qty` - Overwrite a product's quantity
//! - `vitrine set-size` - Move a product's lines to another size
//! - `vitrine replace` - Swap one product for another
//! - `vitrine buy-now` - Show a direct purchase that bypasses the cart
//! - `vitrine clear` - Empty the cart and delete its record

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrine_core::Catalog;
use vitrine_store::CartConfig;

use commands::{AddArgs, BuyNowArgs, ReplaceArgs};

/// Vitrine - storefront cart from the command line
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Product catalog: a JSON array of products
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cart
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove every line of a product
    Remove {
        /// Product id
        id: String,
    },

    /// Set the quantity of every line of a product (0 removes)
    SetQty {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },

    /// Change the selected size of a product's lines
    SetSize {
        /// Product id
        id: String,

        /// Target size
        size: String,
    },

    /// Replace one product with another
    Replace(ReplaceArgs),

    /// Buy a single product now, bypassing the cart
    BuyNow(BuyNowArgs),

    /// Empty the cart and delete its stored record
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CartConfig::load(cli.config.clone()).context("loading cart config")?;
    init_tracing(&config.logging.filter);

    info!(backend = %config.storage.backend, key = %config.storage.key, "Starting vitrine");

    let mut cart = config.open_store().context("opening cart storage")?;
    let catalog = cli.catalog.as_deref().map(load_catalog).transpose()?;
    let catalog = catalog.as_ref();

    match cli.command {
        Commands::Show => {}
        Commands::Add(args) => commands::add(&mut cart, commands::require(catalog)?, args)?,
        Commands::Remove { id } => cart.remove_item(&id),
        Commands::SetQty { id, qty } => cart.update_quantity(&id, qty),
        Commands::SetSize { id, size } => cart.update_item_size(&id, &size),
        Commands::Replace(args) => {
            commands::replace(&mut cart, commands::require(catalog)?, args)?
        }
        Commands::BuyNow(args) => commands::buy_now(&mut cart, commands::require(catalog)?, args)?,
        Commands::Clear => cart.clear_cart(),
    }

    println!("{}", serde_json::to_string_pretty(&cart.snapshot())?);
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the configured filter is used. Logs go to
/// stderr so stdout stays pure JSON.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: &std::path::Path) -> Result<Catalog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog = Catalog::from_json(&json)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    info!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}
