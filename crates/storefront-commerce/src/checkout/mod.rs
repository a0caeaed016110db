//! Checkout: shipping details, the gateway seam and the orchestrator.

mod address;
mod flow;
mod gateway;
mod orchestrator;
mod order;
mod request;

pub use address::{BuyerProfile, ShippingDetails, ShippingField};
pub use flow::{CheckoutAttempt, CheckoutState};
pub use gateway::{GatewayError, GatewaySession, PaymentGateway, Redirect};
pub use orchestrator::{CheckoutFailure, CheckoutOrchestrator, CheckoutSuccess, PreparedCheckout};
pub use order::{OrderDraft, OrderStatus};
pub use request::CheckoutRequest;
