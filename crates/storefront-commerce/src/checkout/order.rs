//! Order draft handed to order persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::PricedLine;
use crate::checkout::{CheckoutRequest, GatewaySession, ShippingDetails};
use crate::ids::{CheckoutId, UserId};
use crate::money::Money;

/// Order status as far as this core knows it.
///
/// Payment confirmation arrives out of band (a provider webhook, handled by
/// order persistence), so every draft produced here is provisional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Shopper was redirected to pay; payment is not yet confirmed.
    #[default]
    Provisional,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Provisional => "provisional",
        }
    }
}

/// What order persistence needs once the shopper is on the payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub checkout_id: CheckoutId,
    pub lines: Vec<PricedLine>,
    pub shipping: ShippingDetails,
    pub buyer_id: Option<UserId>,
    pub gateway_session_handle: String,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Draft an order from the submitted request and the session it opened.
    pub fn from_session(request: CheckoutRequest, session: &GatewaySession) -> Self {
        Self {
            checkout_id: request.checkout_id,
            lines: request.lines,
            shipping: request.shipping,
            buyer_id: request.buyer_id,
            gateway_session_handle: session.handle.clone(),
            subtotal: request.subtotal,
            delivery_fee: request.delivery_fee,
            total: request.total,
            status: OrderStatus::Provisional,
            created_at: Utc::now(),
        }
    }

    /// Check if order is awaiting payment confirmation.
    pub fn is_provisional(&self) -> bool {
        self.status == OrderStatus::Provisional
    }
}
