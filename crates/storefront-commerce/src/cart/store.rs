//! Cart store: the only writer of a [`Cart`].

use serde::{Deserialize, Serialize};
use storefront_cache::{Cache, CacheError, KvStore};

use crate::cart::{Cart, CartLine};
use crate::catalog::{CatalogSnapshot, Product};
use crate::error::CommerceError;
use crate::ids::{ExtraId, ProductId, SizeId};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart:items";

/// Version tag written alongside the cart. Anything else is discarded on load.
const CART_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PersistedCart {
    version: u32,
    cart: Cart,
}

/// Result of a decrement or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// The line is still present with this quantity.
    Quantity(u32),
    /// The line was removed.
    Removed,
    /// There was no line for that product; nothing changed.
    NotInCart,
}

/// Owns the session's cart and mirrors it to durable storage.
///
/// Every successful mutation rewrites the whole cart under
/// [`CART_STORAGE_KEY`]. A failed write is logged and the in-memory cart stays
/// authoritative for the rest of the session.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    cache: Cache<S>,
}

impl<S: KvStore> CartStore<S> {
    /// Open the store, rehydrating a previously saved cart.
    ///
    /// Falls back to an empty cart when nothing was saved or the saved bytes
    /// are unreadable. Undecodable data is deleted; a failed read leaves the
    /// stored bytes alone so a later session can still recover them.
    ///
    /// Quantity limits aren't known here. Call
    /// [`clamp_to_limits`](Self::clamp_to_limits) once a catalog is at hand.
    pub fn open(store: S) -> Self {
        let cache = Cache::new(store);
        let cart = match cache.get::<PersistedCart>(CART_STORAGE_KEY) {
            Ok(Some(saved))
                if saved.version == CART_FORMAT_VERSION && saved.cart.is_well_formed() =>
            {
                tracing::debug!(lines = saved.cart.len(), "rehydrated cart");
                saved.cart
            }
            Ok(Some(saved)) => {
                tracing::warn!(version = saved.version, "discarding malformed saved cart");
                discard(&cache);
                Cart::new()
            }
            Ok(None) => Cart::new(),
            Err(CacheError::SerializeError(e)) => {
                tracing::warn!(error = %e, "discarding unreadable saved cart");
                discard(&cache);
                Cart::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved cart, starting empty");
                Cart::new()
            }
        };
        Self { cart, cache }
    }

    /// Current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of a product, or create its line.
    ///
    /// An existing line gains one unit and takes the supplied size and extras,
    /// replacing its previous configuration. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::LimitExceeded`] if the line is already at the
    ///   product's limit. Nothing changes.
    /// - [`CommerceError::InvariantViolation`] if the product, size or an
    ///   extra isn't in the catalog, or an extra is repeated.
    pub fn add_or_increment<C>(
        &mut self,
        catalog: &C,
        product_id: &ProductId,
        size: Option<SizeId>,
        extras: Vec<ExtraId>,
    ) -> Result<u32, CommerceError>
    where
        C: CatalogSnapshot + ?Sized,
    {
        let product = catalog.require(product_id)?;
        check_selection(product, size.as_ref(), &extras)?;

        let current = self.cart.quantity_of(product_id);
        if current >= product.quantity_limit {
            tracing::debug!(%product_id, limit = product.quantity_limit, "quantity limit reached");
            return Err(CommerceError::LimitExceeded {
                product_id: product_id.clone(),
                limit: product.quantity_limit,
            });
        }

        let quantity = match self.cart.line_mut(product_id) {
            Some(line) => {
                line.quantity += 1;
                line.size = size;
                line.extras = extras;
                line.quantity
            }
            None => {
                self.cart.push(CartLine::new(product_id.clone(), size, extras));
                1
            }
        };

        tracing::debug!(%product_id, quantity, "cart line added");
        self.persist();
        Ok(quantity)
    }

    /// Remove one unit; the line disappears when it reaches zero.
    pub fn decrement(&mut self, product_id: &ProductId) -> CartChange {
        let Some(current) = self.cart.line(product_id).map(|l| l.quantity) else {
            return CartChange::NotInCart;
        };

        let change = if current > 1 {
            if let Some(line) = self.cart.line_mut(product_id) {
                line.quantity = current - 1;
            }
            CartChange::Quantity(current - 1)
        } else {
            self.cart.remove(product_id);
            CartChange::Removed
        };

        tracing::debug!(%product_id, ?change, "cart line decremented");
        self.persist();
        change
    }

    /// Remove a product's line whatever its quantity.
    pub fn remove_line(&mut self, product_id: &ProductId) -> CartChange {
        if !self.cart.remove(product_id) {
            return CartChange::NotInCart;
        }
        tracing::debug!(%product_id, "cart line removed");
        self.persist();
        CartChange::Removed
    }

    /// Empty the cart (after a confirmed order).
    pub fn clear(&mut self) {
        self.cart.clear();
        tracing::debug!("cart cleared");
        self.persist();
    }

    /// Lower any line above its product's current limit to that limit.
    ///
    /// Covers carts saved before a limit was lowered or edited by hand.
    /// Lines whose product has left the catalog are kept for pricing to
    /// report. Returns the products that were clamped.
    pub fn clamp_to_limits<C>(&mut self, catalog: &C) -> Vec<ProductId>
    where
        C: CatalogSnapshot + ?Sized,
    {
        let over: Vec<(ProductId, u32)> = self
            .cart
            .lines()
            .iter()
            .filter_map(|line| {
                let product = catalog.product(&line.product_id)?;
                (line.quantity > product.quantity_limit)
                    .then(|| (line.product_id.clone(), product.quantity_limit))
            })
            .collect();
        if over.is_empty() {
            return Vec::new();
        }

        for (product_id, limit) in &over {
            if let Some(line) = self.cart.line_mut(product_id) {
                tracing::warn!(%product_id, quantity = line.quantity, limit, "clamping cart line to limit");
                line.quantity = *limit;
            }
        }
        self.persist();
        over.into_iter().map(|(id, _)| id).collect()
    }

    /// How many more units of `product` may still be added.
    pub fn headroom(&self, product: &Product) -> u32 {
        product
            .quantity_limit
            .saturating_sub(self.cart.quantity_of(&product.id))
    }

    /// Borrow the cache the cart is persisted to.
    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    fn persist(&self) {
        let saved = PersistedCart {
            version: CART_FORMAT_VERSION,
            cart: self.cart.clone(),
        };
        if let Err(e) = self.cache.set(CART_STORAGE_KEY, &saved) {
            tracing::warn!(error = %e, "failed to persist cart");
        }
    }
}

fn discard<S: KvStore>(cache: &Cache<S>) {
    if let Err(e) = cache.delete(CART_STORAGE_KEY) {
        tracing::warn!(error = %e, "failed to delete unreadable cart");
    }
}

/// Size and extras must come from the product, extras without repeats.
fn check_selection(
    product: &Product,
    size: Option<&SizeId>,
    extras: &[ExtraId],
) -> Result<(), CommerceError> {
    if let Some(size) = size {
        if product.size(size).is_none() {
            return Err(CommerceError::InvariantViolation(format!(
                "size {} is not offered for product {}",
                size, product.id
            )));
        }
    }
    for (i, extra) in extras.iter().enumerate() {
        if product.extra(extra).is_none() {
            return Err(CommerceError::InvariantViolation(format!(
                "extra {} is not offered for product {}",
                extra, product.id
            )));
        }
        if extras[..i].contains(extra) {
            return Err(CommerceError::InvariantViolation(format!(
                "extra {} selected twice for product {}",
                extra, product.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::money::{Currency, Money};
    use storefront_cache::MemoryStore;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Product::new("pizza", "Pizza", Money::new(1000, Currency::USD))
                .with_quantity_limit(3)
                .with_size("small", "Small", 0)
                .with_size("large", "Large", 200)
                .with_extra("cheese", "Cheese", 150)
                .with_extra("bacon", "Bacon", 100),
            Product::new("soda", "Soda", Money::new(250, Currency::USD)),
        ])
        .unwrap()
    }

    fn pizza() -> ProductId {
        ProductId::new("pizza")
    }

    #[test]
    fn test_add_creates_line_with_quantity_one() {
        let mut store = CartStore::open(MemoryStore::new());
        let qty = store
            .add_or_increment(&catalog(), &pizza(), Some(SizeId::new("large")), vec![])
            .unwrap();

        assert_eq!(qty, 1);
        let line = store.cart().line(&pizza()).unwrap();
        assert_eq!(line.size, Some(SizeId::new("large")));
    }

    #[test]
    fn test_increment_overwrites_configuration() {
        let catalog = catalog();
        let mut store = CartStore::open(MemoryStore::new());
        store
            .add_or_increment(&catalog, &pizza(), Some(SizeId::new("small")), vec![ExtraId::new("cheese")])
            .unwrap();
        let qty = store
            .add_or_increment(&catalog, &pizza(), Some(SizeId::new("large")), vec![ExtraId::new("bacon")])
            .unwrap();

        assert_eq!(qty, 2);
        assert_eq!(store.cart().len(), 1);
        let line = store.cart().line(&pizza()).unwrap();
        assert_eq!(line.size, Some(SizeId::new("large")));
        assert_eq!(line.extras, vec![ExtraId::new("bacon")]);
    }

    #[test]
    fn test_limit_is_never_exceeded() {
        let catalog = catalog();
        let mut store = CartStore::open(MemoryStore::new());
        for expected in 1..=3 {
            assert_eq!(
                store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap(),
                expected
            );
        }

        let err = store
            .add_or_increment(&catalog, &pizza(), Some(SizeId::new("large")), vec![])
            .unwrap_err();
        assert!(matches!(err, CommerceError::LimitExceeded { limit: 3, .. }));

        // Rejected add leaves quantity and configuration alone.
        let line = store.cart().line(&pizza()).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.size, None);
    }

    #[test]
    fn test_default_limit_of_one() {
        let catalog = catalog();
        let soda = ProductId::new("soda");
        let mut store = CartStore::open(MemoryStore::new());
        store.add_or_increment(&catalog, &soda, None, vec![]).unwrap();
        assert!(store.add_or_increment(&catalog, &soda, None, vec![]).is_err());
        assert_eq!(store.cart().quantity_of(&soda), 1);
    }

    #[test]
    fn test_unknown_references_rejected() {
        let catalog = catalog();
        let mut store = CartStore::open(MemoryStore::new());

        let missing = store.add_or_increment(&catalog, &ProductId::new("ghost"), None, vec![]);
        assert!(matches!(missing, Err(CommerceError::InvariantViolation(_))));

        let bad_size = store.add_or_increment(&catalog, &pizza(), Some(SizeId::new("xxl")), vec![]);
        assert!(matches!(bad_size, Err(CommerceError::InvariantViolation(_))));

        let bad_extra = store.add_or_increment(&catalog, &pizza(), None, vec![ExtraId::new("gold")]);
        assert!(bad_extra.is_err());

        let repeated = store.add_or_increment(
            &catalog,
            &pizza(),
            None,
            vec![ExtraId::new("cheese"), ExtraId::new("cheese")],
        );
        assert!(repeated.is_err());

        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let catalog = catalog();
        let mut store = CartStore::open(MemoryStore::new());
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();

        assert_eq!(store.decrement(&pizza()), CartChange::Quantity(1));
        assert_eq!(store.decrement(&pizza()), CartChange::Removed);
        assert!(store.cart().line(&pizza()).is_none());
        assert_eq!(store.decrement(&pizza()), CartChange::NotInCart);
    }

    #[test]
    fn test_remove_line_ignores_quantity() {
        let catalog = catalog();
        let mut store = CartStore::open(MemoryStore::new());
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();

        assert_eq!(store.remove_line(&pizza()), CartChange::Removed);
        assert!(store.cart().is_empty());
        assert_eq!(store.remove_line(&pizza()), CartChange::NotInCart);
    }

    #[test]
    fn test_headroom() {
        let catalog = catalog();
        let product = catalog.product(&pizza()).unwrap().clone();
        let mut store = CartStore::open(MemoryStore::new());
        assert_eq!(store.headroom(&product), 3);
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();
        assert_eq!(store.headroom(&product), 2);
    }

    #[test]
    fn test_persistence_roundtrip() {
        let catalog = catalog();
        let backing = MemoryStore::new();
        {
            let mut store = CartStore::open(backing.clone());
            store
                .add_or_increment(
                    &catalog,
                    &pizza(),
                    Some(SizeId::new("large")),
                    vec![ExtraId::new("cheese"), ExtraId::new("bacon")],
                )
                .unwrap();
            store.add_or_increment(&catalog, &pizza(), Some(SizeId::new("large")), vec![ExtraId::new("cheese"), ExtraId::new("bacon")]).unwrap();
            store.add_or_increment(&catalog, &ProductId::new("soda"), None, vec![]).unwrap();
        }

        let reopened = CartStore::open(backing);
        let line = reopened.cart().line(&pizza()).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.size, Some(SizeId::new("large")));
        assert_eq!(line.extras, vec![ExtraId::new("cheese"), ExtraId::new("bacon")]);

        let ids: Vec<_> = reopened.cart().lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["pizza", "soda"]);
    }

    #[test]
    fn test_clear_is_persisted() {
        let catalog = catalog();
        let backing = MemoryStore::new();
        let mut store = CartStore::open(backing.clone());
        store.add_or_increment(&catalog, &pizza(), None, vec![]).unwrap();
        store.clear();

        assert!(CartStore::open(backing).cart().is_empty());
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_empty() {
        let backing = MemoryStore::new();
        backing.set(CART_STORAGE_KEY, b"\x00garbage").unwrap();

        let store = CartStore::open(backing.clone());
        assert!(store.cart().is_empty());
        assert!(!backing.exists(CART_STORAGE_KEY).unwrap());
    }

    #[test]
    fn test_unknown_version_discarded() {
        let backing = MemoryStore::new();
        backing
            .set(CART_STORAGE_KEY, br#"{"version":99,"cart":{"lines":[]}}"#)
            .unwrap();
        assert!(CartStore::open(backing).cart().is_empty());
    }

    #[test]
    fn test_malformed_lines_discarded() {
        let backing = MemoryStore::new();
        let json = br#"{"version":1,"cart":{"lines":[
            {"product_id":"pizza","quantity":0}
        ]}}"#;
        backing.set(CART_STORAGE_KEY, json).unwrap();
        assert!(CartStore::open(backing).cart().is_empty());
    }

    #[test]
    fn test_over_limit_cart_is_clamped_once_catalog_known() {
        let backing = MemoryStore::new();
        let json = br#"{"version":1,"cart":{"lines":[
            {"product_id":"pizza","quantity":50,"size":"large"},
            {"product_id":"soda","quantity":1}
        ]}}"#;
        backing.set(CART_STORAGE_KEY, json).unwrap();

        let mut store = CartStore::open(backing.clone());
        assert_eq!(store.cart().quantity_of(&pizza()), 50);

        let clamped = store.clamp_to_limits(&catalog());
        assert_eq!(clamped, vec![pizza()]);
        assert_eq!(store.cart().quantity_of(&pizza()), 3);
        assert_eq!(store.cart().quantity_of(&ProductId::new("soda")), 1);
        assert_eq!(store.cart().line(&pizza()).unwrap().size, Some(SizeId::new("large")));

        // Persisted, and a second pass has nothing to do.
        let mut reopened = CartStore::open(backing);
        assert_eq!(reopened.cart().quantity_of(&pizza()), 3);
        assert!(reopened.clamp_to_limits(&catalog()).is_empty());
    }

    #[test]
    fn test_clamp_keeps_lines_missing_from_catalog() {
        let backing = MemoryStore::new();
        let json = br#"{"version":1,"cart":{"lines":[{"product_id":"calzone","quantity":9}]}}"#;
        backing.set(CART_STORAGE_KEY, json).unwrap();

        let mut store = CartStore::open(backing);
        assert!(store.clamp_to_limits(&catalog()).is_empty());
        assert_eq!(store.cart().quantity_of(&ProductId::new("calzone")), 9);
    }

    /// Holds bytes but fails every read.
    struct UnreadableStore(MemoryStore);

    impl KvStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::StoreError("device not ready".into()))
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
            self.0.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.0.delete(key)
        }
    }

    #[test]
    fn test_read_failure_keeps_saved_cart() {
        let backing = MemoryStore::new();
        let json = br#"{"version":1,"cart":{"lines":[{"product_id":"pizza","quantity":2}]}}"#;
        backing.set(CART_STORAGE_KEY, json).unwrap();

        let store = CartStore::open(UnreadableStore(backing.clone()));
        assert!(store.cart().is_empty());
        assert!(backing.exists(CART_STORAGE_KEY).unwrap());
        assert_eq!(CartStore::open(backing).cart().quantity_of(&pizza()), 2);
    }
}
