//! End-to-end cart -> price -> checkout flow against a recording gateway.

use std::sync::Mutex;

use async_trait::async_trait;
use storefront_cache::{FileStore, KvStore, MemoryStore};
use storefront_commerce::cart::CART_STORAGE_KEY;
use storefront_commerce::prelude::*;

/// Records every request it receives and answers from a script.
#[derive(Default)]
struct RecordingGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
    fail: bool,
}

impl RecordingGateway {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if self.fail {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(GatewaySession::new(format!("cs_test_{}", requests.len()))
            .with_url("https://checkout.test/pay"))
    }

    fn redirect(&self, session: &GatewaySession) -> Result<Redirect, GatewayError> {
        session
            .url
            .clone()
            .map(|url| Redirect { url })
            .ok_or(GatewayError::MissingHandle)
    }
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Product::new("margherita", "Margherita", Money::new(1000, Currency::USD))
            .with_quantity_limit(4)
            .with_size("small", "Small", 0)
            .with_size("large", "Large", 200)
            .with_extra("cheese", "Extra cheese", 150)
            .with_extra("olives", "Olives", 100),
        Product::new("cola", "Cola", Money::new(300, Currency::USD)).with_quantity_limit(2),
    ])
    .unwrap()
}

fn shipping() -> ShippingDetails {
    ShippingDetails::new("555-0100", "12 Nile St", "Cairo", "Egypt")
}

fn margherita() -> ProductId {
    ProductId::new("margherita")
}

#[tokio::test]
async fn test_full_checkout_charges_priced_total() {
    let catalog = catalog();
    let mut store = CartStore::open(MemoryStore::new());
    for _ in 0..3 {
        store
            .add_or_increment(
                &catalog,
                &margherita(),
                Some(SizeId::new("large")),
                vec![ExtraId::new("cheese"), ExtraId::new("olives")],
            )
            .unwrap();
    }

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), PricingPolicy::default());
    let success = orchestrator
        .checkout(store.cart(), &catalog, shipping(), Some(UserId::new("user-7")))
        .await
        .unwrap();

    let requests = orchestrator.gateway().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].lines[0].unit_price.amount_cents, 1450);
    assert_eq!(requests[0].total.amount_cents, 4850);

    assert_eq!(success.redirect.url, "https://checkout.test/pay");
    assert_eq!(success.order.buyer_id, Some(UserId::new("user-7")));
    assert_eq!(success.order.gateway_session_handle, "cs_test_1");
    assert_eq!(success.order.status, OrderStatus::Provisional);

    // Checkout reads the cart; clearing is up to the caller once the order is confirmed.
    assert_eq!(store.cart().item_count(), 3);
}

#[tokio::test]
async fn test_empty_cart_never_reaches_gateway() {
    let catalog = catalog();
    let store = CartStore::open(MemoryStore::new());
    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), PricingPolicy::default());

    let failure = orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CommerceError::EmptyCart));
    assert_eq!(failure.error.status_code(), 400);
    assert_eq!(failure.attempt.state(), CheckoutState::Failed);
    assert!(orchestrator.gateway().requests().is_empty());
}

#[tokio::test]
async fn test_submission_uses_cart_at_submission_time() {
    let catalog = catalog();
    let policy = PricingPolicy::default();
    let mut store = CartStore::open(MemoryStore::new());
    store
        .add_or_increment(&catalog, &margherita(), None, vec![])
        .unwrap();

    // What the shopper saw on the cart page.
    let displayed = price_cart(store.cart(), &catalog, &policy).unwrap();
    assert_eq!(displayed.total.amount_cents, 1500);

    // Another tab adds a cola before the checkout button is pressed.
    store
        .add_or_increment(&catalog, &ProductId::new("cola"), None, vec![])
        .unwrap();

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), policy);
    orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap();

    let sent = &orchestrator.gateway().requests()[0];
    assert_eq!(sent.lines.len(), 2);
    assert_eq!(sent.total.amount_cents, 1800);
}

#[tokio::test]
async fn test_cart_mutation_while_prepared_does_not_leak_into_request() {
    let catalog = catalog();
    let mut store = CartStore::open(MemoryStore::new());
    store
        .add_or_increment(&catalog, &margherita(), None, vec![])
        .unwrap();

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), PricingPolicy::default());
    let prepared = orchestrator
        .prepare(store.cart(), &catalog, shipping(), None)
        .unwrap();

    // The store stays usable while the request is in flight.
    store.clear();

    let success = orchestrator.submit(prepared).await.unwrap();
    assert_eq!(success.order.lines.len(), 1);
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn test_failed_attempt_leaves_cart_untouched() {
    let catalog = catalog();
    let mut store = CartStore::open(MemoryStore::new());
    store
        .add_or_increment(&catalog, &margherita(), Some(SizeId::new("small")), vec![])
        .unwrap();
    let before = store.cart().clone();

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::failing(), PricingPolicy::default());
    let failure = orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Transient);
    assert_eq!(failure.user_message(), "Failed to process payment. Please try again.");
    assert_eq!(store.cart(), &before);

    // A second press is a fresh attempt with its own id.
    let retry = orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap_err();
    assert_ne!(retry.attempt.id, failure.attempt.id);
    assert_eq!(orchestrator.gateway().requests().len(), 2);
}

#[tokio::test]
async fn test_missing_shipping_fields_reported_together() {
    let catalog = catalog();
    let mut store = CartStore::open(MemoryStore::new());
    store
        .add_or_increment(&catalog, &margherita(), None, vec![])
        .unwrap();

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), PricingPolicy::default());
    let failure = orchestrator
        .checkout(
            store.cart(),
            &catalog,
            ShippingDetails::new("555-0100", "", "Cairo", " "),
            None,
        )
        .await
        .unwrap_err();

    match &failure.error {
        CommerceError::Validation { fields } => {
            assert_eq!(fields, &vec![ShippingField::Address, ShippingField::Country]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(orchestrator.gateway().requests().is_empty());
}

#[test]
fn test_limit_holds_for_every_product() {
    let catalog = catalog();
    let mut store = CartStore::open(MemoryStore::new());

    for product in catalog.products() {
        for _ in 0..product.quantity_limit {
            store
                .add_or_increment(&catalog, &product.id, None, vec![])
                .unwrap();
        }
        let err = store
            .add_or_increment(&catalog, &product.id, None, vec![])
            .unwrap_err();
        assert!(matches!(err, CommerceError::LimitExceeded { .. }));
        assert_eq!(store.cart().quantity_of(&product.id), product.quantity_limit);
        assert_eq!(store.headroom(product), 0);
    }
}

#[test]
fn test_cart_survives_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();

    {
        let mut store = CartStore::open(FileStore::open(dir.path()).unwrap());
        store
            .add_or_increment(
                &catalog,
                &margherita(),
                Some(SizeId::new("large")),
                vec![ExtraId::new("olives")],
            )
            .unwrap();
        store
            .add_or_increment(&catalog, &ProductId::new("cola"), None, vec![])
            .unwrap();
        store
            .add_or_increment(&catalog, &ProductId::new("cola"), None, vec![])
            .unwrap();
        assert_eq!(store.decrement(&ProductId::new("cola")), CartChange::Quantity(1));
    }

    let reloaded = CartStore::open(FileStore::open(dir.path()).unwrap());
    let lines = reloaded.cart().lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].size, Some(SizeId::new("large")));
    assert_eq!(lines[0].extras, vec![ExtraId::new("olives")]);
    assert_eq!(lines[1].quantity, 1);

    let priced = price_cart(reloaded.cart(), &catalog, &PricingPolicy::default()).unwrap();
    assert_eq!(priced.total.amount_cents, 1300 + 300 + 500);
}

#[tokio::test]
async fn test_saved_cart_over_limit_is_refused_before_gateway() {
    let catalog = catalog();
    let backing = MemoryStore::new();
    backing
        .set(
            CART_STORAGE_KEY,
            br#"{"version":1,"cart":{"lines":[{"product_id":"cola","quantity":50}]}}"#,
        )
        .unwrap();

    let mut store = CartStore::open(backing);
    assert_eq!(store.cart().quantity_of(&ProductId::new("cola")), 50);

    let orchestrator = CheckoutOrchestrator::new(RecordingGateway::default(), PricingPolicy::default());
    let failure = orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        CommerceError::LimitExceeded { ref product_id, limit: 2 } if product_id.as_str() == "cola"
    ));
    assert_eq!(failure.kind(), ErrorKind::UserRecoverable);
    assert_eq!(failure.attempt.state(), CheckoutState::Failed);
    assert!(orchestrator.gateway().requests().is_empty());

    // Once clamped, the same cart checks out at the limit.
    store.clamp_to_limits(&catalog);
    let success = orchestrator
        .checkout(store.cart(), &catalog, shipping(), None)
        .await
        .unwrap();
    assert_eq!(success.order.lines[0].quantity, 2);
    assert_eq!(success.order.total.amount_cents, 600 + 500);
    assert_eq!(orchestrator.gateway().requests().len(), 1);
}
