//! Checkout command.

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use dialoguer::{Confirm, Input};
use storefront_commerce::checkout::{
    BuyerProfile, CheckoutFailure, CheckoutOrchestrator, OrderDraft, ShippingDetails,
    ShippingField,
};

use super::CheckoutArgs;
use crate::context::Context;
use crate::output::state_badge;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let store = ctx.cart_store()?;

    let profile = match args.profile.as_deref() {
        Some(path) => Some(load_profile(&ctx.resolve_path(path))?),
        None => None,
    };
    let mut shipping = profile
        .as_ref()
        .map(ShippingDetails::prefill_from)
        .unwrap_or_default();
    apply_flags(&mut shipping, &args);

    let interactive = !args.no_input && !ctx.output.is_json();
    if interactive && !store.cart().is_empty() {
        prompt_missing(&mut shipping)?;
    }

    let orchestrator = CheckoutOrchestrator::new(ctx.gateway()?, ctx.pricing_policy()?);
    let prepared = orchestrator
        .prepare(
            store.cart(),
            &catalog,
            shipping,
            profile.map(|p| p.id),
        )
        .map_err(|f| report_failure(f, ctx))?;

    let request = prepared.request();
    if !ctx.output.is_json() {
        ctx.output.header("Checkout");
        for line in &request.lines {
            ctx.output
                .list_item(&format!("{} x{}  {}", line.label(), line.quantity, line.line_total.display()));
        }
        ctx.output.kv("Delivery", &request.delivery_fee.display());
        ctx.output.kv("Total", &request.total.display());
        ctx.output.kv("Ship to", &request.shipping.one_line());
    }

    if !args.yes && interactive {
        let confirmed = Confirm::new()
            .with_prompt(format!("Pay {}?", request.total.display()))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Contacting payment provider...");
    let result = orchestrator.submit(prepared).await;
    spinner.finish_and_clear();

    let success = result.map_err(|f| report_failure(f, ctx))?;
    save_draft(&store, &success.order);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "state": success.attempt.state().as_str(),
            "redirect_url": success.redirect.url,
            "order": success.order,
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Checkout {}: continue payment at",
        state_badge(success.attempt.state())
    ));
    println!("  {}", success.redirect.url);
    ctx.output.info(&format!(
        "Order {} is provisional until payment is confirmed; run `storefront cart clear` afterwards.",
        success.order.checkout_id
    ));
    Ok(())
}

fn load_profile(path: &Path) -> Result<BuyerProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read buyer profile: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse buyer profile: {}", path.display()))
}

/// Flags win over prefilled values.
fn apply_flags(shipping: &mut ShippingDetails, args: &CheckoutArgs) {
    let flags = [
        (ShippingField::Phone, &args.phone),
        (ShippingField::Address, &args.address),
        (ShippingField::City, &args.city),
        (ShippingField::Country, &args.country),
    ];
    for (field, value) in flags {
        if let Some(value) = value {
            *field_mut(shipping, field) = value.clone();
        }
    }
}

fn prompt_missing(shipping: &mut ShippingDetails) -> Result<()> {
    for field in shipping.missing_fields() {
        let value: String = Input::new()
            .with_prompt(prompt_label(field))
            .allow_empty(true)
            .interact_text()?;
        *field_mut(shipping, field) = value;
    }
    Ok(())
}

fn field_mut(shipping: &mut ShippingDetails, field: ShippingField) -> &mut String {
    match field {
        ShippingField::Phone => &mut shipping.phone,
        ShippingField::Address => &mut shipping.address,
        ShippingField::City => &mut shipping.city,
        ShippingField::Country => &mut shipping.country,
    }
}

fn prompt_label(field: ShippingField) -> &'static str {
    match field {
        ShippingField::Phone => "Phone number",
        ShippingField::Address => "Address",
        ShippingField::City => "City",
        ShippingField::Country => "Country",
    }
}

/// Hand the draft to order persistence: here, the same store as the cart.
fn save_draft<S: storefront_cache::KvStore>(
    store: &storefront_commerce::cart::CartStore<S>,
    order: &OrderDraft,
) {
    let key = format!("order_{}", order.checkout_id);
    if let Err(e) = store.cache().set(&key, order) {
        tracing::warn!(checkout_id = %order.checkout_id, error = %e, "failed to save order draft");
    }
}

fn report_failure(failure: CheckoutFailure, ctx: &Context) -> anyhow::Error {
    if ctx.output.is_verbose() {
        let states: Vec<String> = failure
            .attempt
            .history()
            .iter()
            .map(|s| state_badge(*s))
            .collect();
        ctx.output.kv("Attempt", &states.join(" -> "));
    }
    anyhow!(failure.user_message())
}
