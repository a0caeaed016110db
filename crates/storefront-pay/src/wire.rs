//! Request and response bodies for the hosted checkout API.

use serde::{Deserialize, Serialize};
use storefront_commerce::checkout::CheckoutRequest;

use crate::config::HostedCheckoutConfig;

/// Name of the line that carries the delivery fee.
pub const DELIVERY_LINE_NAME: &str = "Delivery";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SessionCreateBody {
    pub mode: &'static str,
    pub payment_method_types: Vec<&'static str>,
    pub client_reference_id: String,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LineItem {
    pub price_data: PriceData,
    pub quantity: u32,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PriceData {
    /// Lowercase ISO code.
    pub currency: String,
    pub product_data: ProductData,
    /// Minor units per item.
    pub unit_amount: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProductData {
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Metadata {
    /// Shipping details as a JSON string.
    pub shipping: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
}

impl SessionCreateBody {
    /// Build the body for a checkout request.
    ///
    /// Each priced line is charged at its full unit price. A non-zero delivery
    /// fee goes out as a separate line, so the provider charges exactly
    /// `request.total`.
    pub fn from_request(
        request: &CheckoutRequest,
        config: &HostedCheckoutConfig,
    ) -> Result<Self, serde_json::Error> {
        let currency = request.total.currency.code().to_lowercase();

        let mut line_items: Vec<LineItem> = request
            .lines
            .iter()
            .map(|line| LineItem {
                price_data: PriceData {
                    currency: currency.clone(),
                    product_data: ProductData { name: line.label() },
                    unit_amount: line.unit_price.amount_cents,
                },
                quantity: line.quantity,
            })
            .collect();

        if !request.delivery_fee.is_zero() {
            line_items.push(LineItem {
                price_data: PriceData {
                    currency,
                    product_data: ProductData {
                        name: DELIVERY_LINE_NAME.to_string(),
                    },
                    unit_amount: request.delivery_fee.amount_cents,
                },
                quantity: 1,
            });
        }

        Ok(Self {
            mode: "payment",
            payment_method_types: vec!["card"],
            client_reference_id: request.checkout_id.to_string(),
            line_items,
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
            metadata: Metadata {
                shipping: serde_json::to_string(&request.shipping)?,
                buyer_id: request.buyer_id.as_ref().map(|id| id.to_string()),
            },
        })
    }

    /// Sum the provider will charge.
    pub fn charged_total(&self) -> i64 {
        self.line_items
            .iter()
            .map(|l| l.price_data.unit_amount * i64::from(l.quantity))
            .sum()
    }
}

/// Successful session creation response.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Error envelope: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
