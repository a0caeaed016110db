//! Provider-agnostic payment request.

use crate::cart::{PricedCart, PricedLine};
use crate::checkout::ShippingDetails;
use crate::ids::{CheckoutId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Everything a gateway needs to open a hosted payment session.
///
/// Built at submission time from the cart as it is then, and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Attempt this request belongs to; usable as an idempotency key.
    pub checkout_id: CheckoutId,
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub shipping: ShippingDetails,
    pub buyer_id: Option<UserId>,
}

impl CheckoutRequest {
    /// Assemble a request from a freshly priced cart.
    pub fn new(
        checkout_id: CheckoutId,
        priced: PricedCart,
        shipping: ShippingDetails,
        buyer_id: Option<UserId>,
    ) -> Self {
        Self {
            checkout_id,
            lines: priced.lines,
            subtotal: priced.subtotal,
            delivery_fee: priced.delivery_fee,
            total: priced.total,
            shipping,
            buyer_id,
        }
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
