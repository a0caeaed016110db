//! Commerce error types.

use thiserror::Error;

use crate::checkout::{CheckoutState, ShippingField};
use crate::ids::ProductId;
use crate::money::Currency;

/// Errors that can occur in cart, pricing and checkout operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Adding one more unit would exceed the product's quantity limit.
    #[error("Quantity limit reached for {product_id}: at most {limit}")]
    LimitExceeded { product_id: ProductId, limit: u32 },

    /// Checkout was submitted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Required shipping fields are blank.
    #[error("Missing shipping fields: {}", field_list(.fields))]
    Validation { fields: Vec<ShippingField> },

    /// The payment gateway refused the request or could not be reached.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// The payment gateway client is not usable as configured.
    #[error("Payment gateway misconfigured: {0}")]
    GatewayMisconfigured(String),

    /// Cart or catalog data broke an invariant the core relies on.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: Currency, got: Currency },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition {
        from: CheckoutState,
        to: CheckoutState,
    },

    /// Durable storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How an error should be treated by whoever shows it to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shown inline; nothing is corrupted and the shopper may retry at once.
    UserRecoverable,
    /// External dependency failed; shown as a generic retry prompt.
    Transient,
    /// Programmer or data error; logged in full, shown generically.
    Internal,
}

impl CommerceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::LimitExceeded { .. }
            | CommerceError::EmptyCart
            | CommerceError::Validation { .. } => ErrorKind::UserRecoverable,
            CommerceError::Gateway(_) => ErrorKind::Transient,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::UserRecoverable => 400,
            ErrorKind::Transient => 502,
            ErrorKind::Internal => 500,
        }
    }

    /// The single message a shopper may see. Never includes internal detail.
    pub fn user_message(&self) -> String {
        match self {
            CommerceError::LimitExceeded { limit, .. } => {
                format!("You can have at most {} of this item in your cart.", limit)
            }
            CommerceError::EmptyCart => "Your cart is empty.".to_string(),
            CommerceError::Validation { fields } => fields
                .iter()
                .map(|f| f.message())
                .collect::<Vec<_>>()
                .join(" "),
            CommerceError::Gateway(_) => {
                "Failed to process payment. Please try again.".to_string()
            }
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

fn field_list(fields: &[ShippingField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<storefront_cache::CacheError> for CommerceError {
    fn from(e: storefront_cache::CacheError) -> Self {
        CommerceError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
