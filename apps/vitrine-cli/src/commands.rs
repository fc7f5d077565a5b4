//! Subcommands that need product lookups.

use anyhow::{anyhow, Result};
use clap::Args;
use tracing::debug;
use vitrine_core::{Catalog, DirectPurchase, VariantSelection, DEFAULT_QUANTITY};
use vitrine_store::CartStore;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Product id
    pub id: String,

    /// Units to add
    #[arg(long, default_value_t = DEFAULT_QUANTITY, allow_negative_numbers = true)]
    pub qty: i64,

    /// Selected size
    #[arg(long)]
    pub size: Option<String>,

    /// Variant selection as key=value (repeatable)
    #[arg(long = "variant", value_parser = parse_key_val)]
    pub variants: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Product id currently in the cart
    pub old_id: String,

    /// Replacement product id
    pub new_id: String,

    /// Requested units when the swap is cross-category
    #[arg(long, default_value_t = DEFAULT_QUANTITY)]
    pub qty: i64,

    /// Selected size for the replacement
    #[arg(long)]
    pub size: Option<String>,

    /// Variant selection as key=value (repeatable)
    #[arg(long = "variant", value_parser = parse_key_val)]
    pub variants: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct BuyNowArgs {
    /// Product id
    pub id: String,

    /// Units to buy
    #[arg(long, default_value_t = DEFAULT_QUANTITY)]
    pub qty: i64,

    /// Variant id (takes precedence over --size)
    #[arg(long)]
    pub variant_id: Option<String>,

    /// Selected size
    #[arg(long)]
    pub size: Option<String>,
}

pub fn require(catalog: Option<&Catalog>) -> Result<&Catalog> {
    catalog.ok_or_else(|| anyhow!("this command needs --catalog <path>"))
}

pub fn add(cart: &mut CartStore, catalog: &Catalog, args: AddArgs) -> Result<()> {
    let product = catalog.get(&args.id)?;
    cart.add_item(product, args.qty, selection(args.variants), args.size);
    Ok(())
}

pub fn replace(cart: &mut CartStore, catalog: &Catalog, args: ReplaceArgs) -> Result<()> {
    let product = catalog.get(&args.new_id)?;
    cart.replace_item(
        &args.old_id,
        product,
        args.qty,
        selection(args.variants),
        args.size,
    );
    Ok(())
}

/// `None` when no `--variant` was given, so existing selections are kept.
fn selection(pairs: Vec<(String, String)>) -> Option<VariantSelection> {
    (!pairs.is_empty()).then(|| pairs.into_iter().collect())
}

pub fn buy_now(cart: &mut CartStore, catalog: &Catalog, args: BuyNowArgs) -> Result<()> {
    let product = catalog.get(&args.id)?.clone();

    let mut purchase = DirectPurchase::new(product, args.qty);
    if let Some(variant_id) = args.variant_id {
        purchase = purchase.with_variant(variant_id);
    }
    if let Some(size) = args.size {
        purchase = purchase.with_size(size);
    }

    debug!(product_id = %args.id, "direct purchase is not persisted");
    cart.set_direct_purchase_item(purchase);
    Ok(())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty variant key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
