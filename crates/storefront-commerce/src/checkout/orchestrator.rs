//! Checkout orchestrator.
//!
//! Turns the cart as it is *now* into a payment request, makes exactly one
//! gateway call, and ends every attempt in `Redirected` or `Failed`.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Redirected
//!             |              |
//!             +--> Failed <--+
//! ```
//!
//! The cart is only ever read. [`prepare`](CheckoutOrchestrator::prepare) is
//! synchronous and returns an owned [`PreparedCheckout`], so nothing borrows
//! the cart store while the gateway call is awaited.

use thiserror::Error;

use crate::cart::{price_cart, Cart, PricingPolicy};
use crate::catalog::CatalogSnapshot;
use crate::checkout::{
    CheckoutAttempt, CheckoutRequest, CheckoutState, GatewayError, OrderDraft, PaymentGateway,
    Redirect, ShippingDetails,
};
use crate::error::{CommerceError, ErrorKind};
use crate::ids::UserId;

/// A validated, priced request waiting to be submitted.
#[derive(Debug, Clone)]
pub struct PreparedCheckout {
    attempt: CheckoutAttempt,
    request: CheckoutRequest,
}

impl PreparedCheckout {
    pub fn attempt(&self) -> &CheckoutAttempt {
        &self.attempt
    }

    pub fn request(&self) -> &CheckoutRequest {
        &self.request
    }
}

/// A redirected attempt.
#[derive(Debug, Clone)]
pub struct CheckoutSuccess {
    pub attempt: CheckoutAttempt,
    pub redirect: Redirect,
    /// Draft for order persistence; provisional until payment is confirmed.
    pub order: OrderDraft,
}

/// A failed attempt. The cart is exactly as it was before submission.
#[derive(Error, Debug)]
#[error("checkout failed: {error}")]
pub struct CheckoutFailure {
    pub attempt: CheckoutAttempt,
    #[source]
    pub error: CommerceError,
}

impl CheckoutFailure {
    /// The one message to show the shopper.
    pub fn user_message(&self) -> String {
        self.error.user_message()
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Drives checkout attempts against a payment gateway.
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator<G> {
    gateway: G,
    policy: PricingPolicy,
}

impl<G: PaymentGateway> CheckoutOrchestrator<G> {
    pub fn new(gateway: G, policy: PricingPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Start an attempt: validate, then price the cart as it is right now.
    ///
    /// Leaves the attempt in `Validating` on success, `Failed` otherwise.
    pub fn prepare<C>(
        &self,
        cart: &Cart,
        catalog: &C,
        shipping: ShippingDetails,
        buyer_id: Option<UserId>,
    ) -> Result<PreparedCheckout, CheckoutFailure>
    where
        C: CatalogSnapshot + ?Sized,
    {
        let mut attempt = CheckoutAttempt::new();
        if let Err(error) = attempt.advance(CheckoutState::Validating) {
            return Err(CheckoutFailure { attempt, error });
        }

        match self.build_request(&attempt, cart, catalog, shipping, buyer_id) {
            Ok(request) => Ok(PreparedCheckout { attempt, request }),
            Err(error) => Err(fail(attempt, error)),
        }
    }

    fn build_request<C>(
        &self,
        attempt: &CheckoutAttempt,
        cart: &Cart,
        catalog: &C,
        shipping: ShippingDetails,
        buyer_id: Option<UserId>,
    ) -> Result<CheckoutRequest, CommerceError>
    where
        C: CatalogSnapshot + ?Sized,
    {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        // The cart may predate a lowered limit or come from edited storage.
        for line in cart.lines() {
            let product = catalog.require(&line.product_id)?;
            if line.quantity > product.quantity_limit {
                return Err(CommerceError::LimitExceeded {
                    product_id: line.product_id.clone(),
                    limit: product.quantity_limit,
                });
            }
        }
        shipping.validate()?;

        let priced = price_cart(cart, catalog, &self.policy)?;
        Ok(CheckoutRequest::new(
            attempt.id.clone(),
            priced,
            shipping,
            buyer_id,
        ))
    }

    /// Submit a prepared request: one gateway call, no retry.
    pub async fn submit(
        &self,
        prepared: PreparedCheckout,
    ) -> Result<CheckoutSuccess, CheckoutFailure> {
        let PreparedCheckout {
            mut attempt,
            request,
        } = prepared;

        if let Err(error) = attempt.advance(CheckoutState::Submitting) {
            return Err(fail(attempt, error));
        }
        tracing::debug!(
            checkout_id = %attempt.id,
            total_cents = request.total.amount_cents,
            lines = request.lines.len(),
            "submitting checkout"
        );

        let outcome = match self.gateway.create_session(&request).await {
            Ok(session) if session.handle.trim().is_empty() => Err(GatewayError::MissingHandle),
            Ok(session) => self
                .gateway
                .redirect(&session)
                .map(|redirect| (session, redirect)),
            Err(e) => Err(e),
        };

        let (session, redirect) = match outcome {
            Ok(pair) => pair,
            Err(e) => return Err(fail(attempt, e.into())),
        };

        if let Err(error) = attempt.advance(CheckoutState::Redirected) {
            return Err(fail(attempt, error));
        }
        tracing::info!(
            checkout_id = %attempt.id,
            total_cents = request.total.amount_cents,
            "checkout redirected to payment page"
        );

        Ok(CheckoutSuccess {
            attempt,
            redirect,
            order: OrderDraft::from_session(request, &session),
        })
    }

    /// Prepare and submit in one step.
    pub async fn checkout<C>(
        &self,
        cart: &Cart,
        catalog: &C,
        shipping: ShippingDetails,
        buyer_id: Option<UserId>,
    ) -> Result<CheckoutSuccess, CheckoutFailure>
    where
        C: CatalogSnapshot + ?Sized,
    {
        let prepared = self.prepare(cart, catalog, shipping, buyer_id)?;
        self.submit(prepared).await
    }
}

/// End the attempt in `Failed`, logging at the level the error deserves.
fn fail(mut attempt: CheckoutAttempt, error: CommerceError) -> CheckoutFailure {
    match error.kind() {
        ErrorKind::UserRecoverable => {
            tracing::debug!(checkout_id = %attempt.id, error = %error, "checkout rejected")
        }
        ErrorKind::Transient => {
            tracing::warn!(checkout_id = %attempt.id, error = %error, "payment gateway failed")
        }
        ErrorKind::Internal => {
            tracing::error!(checkout_id = %attempt.id, error = ?error, "checkout failed")
        }
    }
    attempt.fail();
    CheckoutFailure { attempt, error }
}
