//! Read-only catalog lookups.

use std::collections::HashMap;

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Currency;

/// A read-only view of current product data.
///
/// The core never writes to a snapshot and assumes it stays consistent for
/// the duration of one pricing pass.
pub trait CatalogSnapshot {
    /// Look up a product.
    fn product(&self, id: &ProductId) -> Option<&Product>;

    /// Look up a product the cart already references.
    ///
    /// A missing product means cart and catalog disagree, which is reported
    /// as [`CommerceError::InvariantViolation`] rather than silently dropping
    /// the line.
    fn require(&self, id: &ProductId) -> Result<&Product, CommerceError> {
        self.product(id).ok_or_else(|| {
            CommerceError::InvariantViolation(format!("product {} is not in the catalog", id))
        })
    }
}

/// Catalog held in memory, validated on construction.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    currency: Currency,
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl InMemoryCatalog {
    /// Build a catalog from products.
    ///
    /// Every product must pass [`Product::validate`], IDs must be unique, and
    /// all products must share one currency.
    pub fn new(products: Vec<Product>) -> Result<Self, CommerceError> {
        let currency = products
            .first()
            .map(|p| p.currency())
            .unwrap_or_default();

        let mut index = HashMap::with_capacity(products.len());
        for (i, product) in products.iter().enumerate() {
            product.validate()?;
            if product.currency() != currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency,
                    got: product.currency(),
                });
            }
            if index.insert(product.id.clone(), i).is_some() {
                return Err(CommerceError::InvariantViolation(format!(
                    "duplicate product {}",
                    product.id
                )));
            }
        }

        Ok(Self {
            currency,
            products,
            index,
        })
    }

    /// Catalog currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Products in load order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogSnapshot for InMemoryCatalog {
    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }
}
