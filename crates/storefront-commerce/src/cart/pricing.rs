//! Pricing engine.
//!
//! Pure functions from a cart plus catalog data to amounts. Nothing here is
//! cached: every call recomputes from the lines it is handed.
//!
//! ```text
//! unit_price = base_price + size delta + sum(extra deltas)
//! line_total = unit_price * quantity
//! subtotal   = sum(line_total)
//! total      = subtotal + delivery_fee
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::catalog::{CatalogSnapshot, Product};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Flat delivery fee charged once per order.
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 500;

/// Order-level pricing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Added once to every order, including an empty one.
    pub delivery_fee: Money,
}

impl PricingPolicy {
    pub fn new(delivery_fee: Money) -> Self {
        Self { delivery_fee }
    }

    /// Default fee in the given currency.
    pub fn for_currency(currency: Currency) -> Self {
        Self::new(Money::new(DEFAULT_DELIVERY_FEE_CENTS, currency))
    }

    pub fn currency(&self) -> Currency {
        self.delivery_fee.currency
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::for_currency(Currency::default())
    }
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub name: String,
    pub size_name: Option<String>,
    pub extra_names: Vec<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl PricedLine {
    /// Human label, e.g. "Pizza (Large, Cheese, Bacon)".
    pub fn label(&self) -> String {
        let options: Vec<&str> = self
            .size_name
            .iter()
            .chain(self.extra_names.iter())
            .map(String::as_str)
            .collect();
        if options.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, options.join(", "))
        }
    }
}

/// Totals for a whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    /// Same order as the cart's lines.
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// Price one line against its product.
pub fn price_line(line: &CartLine, product: &Product) -> Result<PricedLine, CommerceError> {
    if line.product_id != product.id {
        return Err(CommerceError::InvariantViolation(format!(
            "line for {} priced against product {}",
            line.product_id, product.id
        )));
    }
    if product.base_price.is_negative() {
        return Err(CommerceError::InvariantViolation(format!(
            "product {} has a negative base price",
            product.id
        )));
    }

    let mut unit_price = product.base_price;
    let mut size_name = None;
    if let Some(size_id) = &line.size {
        let size = product.size(size_id).ok_or_else(|| {
            CommerceError::InvariantViolation(format!(
                "size {} is no longer offered for {}",
                size_id, product.id
            ))
        })?;
        unit_price = add_delta(unit_price, size.price_delta, &product.id)?;
        size_name = Some(size.name.clone());
    }

    let mut extra_names = Vec::with_capacity(line.extras.len());
    for extra_id in &line.extras {
        let extra = product.extra(extra_id).ok_or_else(|| {
            CommerceError::InvariantViolation(format!(
                "extra {} is no longer offered for {}",
                extra_id, product.id
            ))
        })?;
        unit_price = add_delta(unit_price, extra.price_delta, &product.id)?;
        extra_names.push(extra.name.clone());
    }

    let line_total = unit_price.checked_mul(line.quantity)?;

    Ok(PricedLine {
        product_id: line.product_id.clone(),
        name: product.name.clone(),
        size_name,
        extra_names,
        unit_price,
        quantity: line.quantity,
        line_total,
    })
}

fn add_delta(price: Money, delta: Money, product_id: &ProductId) -> Result<Money, CommerceError> {
    if delta.is_negative() {
        return Err(CommerceError::InvariantViolation(format!(
            "product {} has a negative price delta",
            product_id
        )));
    }
    price.checked_add(&delta)
}

/// Price every line and compute order totals.
///
/// An empty cart prices to `subtotal = 0`, `total = delivery_fee`. Checkout
/// refuses empty carts separately.
pub fn price_cart<C>(
    cart: &Cart,
    catalog: &C,
    policy: &PricingPolicy,
) -> Result<PricedCart, CommerceError>
where
    C: CatalogSnapshot + ?Sized,
{
    let lines = cart
        .lines()
        .iter()
        .map(|line| price_line(line, catalog.require(&line.product_id)?))
        .collect::<Result<Vec<_>, _>>()?;

    let subtotal = Money::checked_sum(lines.iter().map(|l| &l.line_total), policy.currency())?;
    let total = subtotal.checked_add(&policy.delivery_fee)?;

    Ok(PricedCart {
        lines,
        subtotal,
        delivery_fee: policy.delivery_fee,
        total,
    })
}
