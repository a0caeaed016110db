//! Cart, pricing and checkout core for the storefront.
//!
//! - **Catalog**: read-only product snapshot with sizes, extras and limits
//! - **Cart**: persisted cart store, pure pricing engine
//! - **Checkout**: shipping validation, gateway seam, attempt orchestration
//!
//! # Example
//!
//! ```rust
//! use storefront_cache::MemoryStore;
//! use storefront_commerce::prelude::*;
//!
//! let catalog = InMemoryCatalog::new(vec![
//!     Product::new("pizza", "Pizza", Money::new(1000, Currency::USD))
//!         .with_quantity_limit(3)
//!         .with_size("large", "Large", 200)
//!         .with_extra("cheese", "Cheese", 150)
//!         .with_extra("bacon", "Bacon", 100),
//! ])
//! .unwrap();
//!
//! let mut store = CartStore::open(MemoryStore::new());
//! for _ in 0..3 {
//!     store
//!         .add_or_increment(
//!             &catalog,
//!             &ProductId::new("pizza"),
//!             Some(SizeId::new("large")),
//!             vec![ExtraId::new("cheese"), ExtraId::new("bacon")],
//!         )
//!         .unwrap();
//! }
//!
//! let priced = price_cart(store.cart(), &catalog, &PricingPolicy::default()).unwrap();
//! assert_eq!(priced.lines[0].unit_price.amount_cents, 1450);
//! assert_eq!(priced.total.display(), "$48.50");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        CatalogSnapshot, ExtraOption, InMemoryCatalog, Product, SizeOption,
    };

    // Cart
    pub use crate::cart::{
        price_cart, price_line, Cart, CartChange, CartLine, CartStore, PricedCart, PricedLine,
        PricingPolicy,
    };

    // Checkout
    pub use crate::checkout::{
        BuyerProfile, CheckoutAttempt, CheckoutFailure, CheckoutOrchestrator, CheckoutRequest,
        CheckoutState, CheckoutSuccess, GatewayError, GatewaySession, OrderDraft, OrderStatus,
        PaymentGateway, Redirect, ShippingDetails, ShippingField,
    };
}
