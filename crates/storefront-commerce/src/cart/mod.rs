//! Cart state, persistence and pricing.

#[allow(clippy::module_inception)]
mod cart;
mod pricing;
mod store;

pub use cart::{Cart, CartLine};
pub use pricing::{
    price_cart, price_line, PricedCart, PricedLine, PricingPolicy, DEFAULT_DELIVERY_FEE_CENTS,
};
pub use store::{CartChange, CartStore, CART_STORAGE_KEY};
