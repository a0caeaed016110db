//! Cart commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use storefront_cache::KvStore;
use storefront_commerce::cart::{price_cart, CartChange, CartStore};
use storefront_commerce::catalog::{CatalogSnapshot, InMemoryCatalog, Product};
use storefront_commerce::{ExtraId, ProductId, SizeId};

use super::{shopper_error, CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CartCommand::Add {
            product,
            size,
            extras,
        } => add(&product, size, extras, ctx),
        CartCommand::Dec { product } => decrement(&product, ctx),
        CartCommand::Remove { product } => remove(&product, ctx),
        CartCommand::Clear { yes } => clear(yes, ctx),
        CartCommand::Show => show(ctx),
    }
}

fn add(product: &str, size: Option<String>, extras: Vec<String>, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let product = known_product(&catalog, product)?;
    let mut store = ctx.cart_store()?;
    enforce_limits(&mut store, &catalog, ctx);

    let quantity = store
        .add_or_increment(
            &catalog,
            &product.id,
            size.map(SizeId::new),
            extras.into_iter().map(ExtraId::new).collect(),
        )
        .map_err(shopper_error)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "product_id": product.id,
            "quantity": quantity,
            "limit": product.quantity_limit,
            "cart_items": store.cart().item_count(),
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Added {} ({} of {})",
        product.name, quantity, product.quantity_limit
    ));
    if store.headroom(product) == 0 {
        ctx.output.info("Quantity limit reached for this product");
    }
    Ok(())
}

fn decrement(product: &str, ctx: &Context) -> Result<()> {
    let mut store = ctx.cart_store()?;
    let change = store.decrement(&ProductId::new(product));
    report_change(product, change, &store, ctx)
}

fn remove(product: &str, ctx: &Context) -> Result<()> {
    let mut store = ctx.cart_store()?;
    let change = store.remove_line(&ProductId::new(product));
    report_change(product, change, &store, ctx)
}

fn report_change<S: KvStore>(
    product: &str,
    change: CartChange,
    store: &CartStore<S>,
    ctx: &Context,
) -> Result<()> {
    if ctx.output.is_json() {
        let quantity = match change {
            CartChange::Quantity(q) => q,
            CartChange::Removed | CartChange::NotInCart => 0,
        };
        ctx.output.json(&serde_json::json!({
            "product_id": product,
            "quantity": quantity,
            "in_cart": quantity > 0,
            "cart_items": store.cart().item_count(),
        }));
        return Ok(());
    }

    match change {
        CartChange::Quantity(q) => ctx.output.success(&format!("{} now x{}", product, q)),
        CartChange::Removed => ctx.output.success(&format!("Removed {} from the cart", product)),
        CartChange::NotInCart => ctx.output.warn(&format!("{} is not in the cart", product)),
    }
    Ok(())
}

fn clear(yes: bool, ctx: &Context) -> Result<()> {
    let mut store = ctx.cart_store()?;
    if store.cart().is_empty() {
        ctx.output.info("Cart is already empty");
        return Ok(());
    }

    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove all {} item(s) from the cart?",
                store.cart().item_count()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cart left unchanged");
            return Ok(());
        }
    }

    store.clear();
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "cleared": true }));
    } else {
        ctx.output.success("Cart cleared");
    }
    Ok(())
}

fn show(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let mut store = ctx.cart_store()?;
    enforce_limits(&mut store, &catalog, ctx);
    let priced = price_cart(store.cart(), &catalog, &ctx.pricing_policy()?).map_err(shopper_error)?;

    if ctx.output.is_json() {
        ctx.output.json(&priced);
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({} items)", store.cart().item_count()));
    let widths = [36, 10, 5, 10];
    if priced.lines.is_empty() {
        ctx.output.info("Your cart is empty");
    } else {
        ctx.output.table_row(&["ITEM", "UNIT", "QTY", "TOTAL"], &widths);
    }
    for line in &priced.lines {
        ctx.output.table_row(
            &[
                &line.label(),
                &line.unit_price.display(),
                &line.quantity.to_string(),
                &line.line_total.display(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv("Subtotal", &priced.subtotal.display());
    ctx.output.kv("Delivery", &priced.delivery_fee.display());
    ctx.output.kv("Total", &priced.total.display());
    Ok(())
}

/// Bring a saved cart back within the catalog's current limits.
fn enforce_limits<S: KvStore>(store: &mut CartStore<S>, catalog: &InMemoryCatalog, ctx: &Context) {
    for product_id in store.clamp_to_limits(catalog) {
        ctx.output.warn(&format!(
            "{} was over its quantity limit and has been reduced to {}",
            product_id,
            store.cart().quantity_of(&product_id)
        ));
    }
}

fn known_product<'a>(catalog: &'a InMemoryCatalog, id: &str) -> Result<&'a Product> {
    match catalog.product(&ProductId::new(id)) {
        Some(product) => Ok(product),
        None => bail!(
            "Unknown product '{}'. Run `storefront catalog list` to see what's available.",
            id
        ),
    }
}
