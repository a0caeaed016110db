//! Catalog commands.

use anyhow::Result;

use super::{CatalogArgs, CatalogCommand};
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CatalogCommand::List => list(ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let store = ctx.cart_store()?;

    if ctx.output.is_json() {
        ctx.output.json(&catalog.products());
        return Ok(());
    }

    ctx.output.header(&format!("Catalog ({} products)", catalog.len()));
    for product in catalog.products() {
        println!();
        ctx.output.kv(product.id.as_str(), &product.name);
        ctx.output.kv("price", &product.base_price.display());
        ctx.output.kv(
            "limit",
            &format!(
                "{} ({} more allowed)",
                product.quantity_limit,
                store.headroom(product)
            ),
        );
        for size in &product.sizes {
            ctx.output.list_item(&format!(
                "size {} ({}): +{}",
                size.id,
                size.name,
                size.price_delta.display()
            ));
        }
        for extra in &product.extras {
            ctx.output.list_item(&format!(
                "extra {} ({}): +{}",
                extra.id,
                extra.name,
                extra.price_delta.display()
            ));
        }
    }
    Ok(())
}
