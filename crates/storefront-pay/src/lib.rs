//! Hosted-checkout payment gateway for the storefront.
//!
//! [`HostedCheckoutClient`] implements
//! [`PaymentGateway`](storefront_commerce::checkout::PaymentGateway) over
//! HTTP: it opens a payment session for a priced cart and tells the caller
//! where to send the shopper.
//!
//! ```rust,no_run
//! use storefront_pay::{HostedCheckoutClient, HostedCheckoutConfig};
//!
//! let config = HostedCheckoutConfig::new("https://api.stripe.com", "sk_test_...");
//! let client = HostedCheckoutClient::new(config).unwrap();
//! ```

mod client;
mod config;
pub mod wire;

pub use client::HostedCheckoutClient;
pub use config::{HostedCheckoutConfig, SESSION_ID_PLACEHOLDER};
