//! Product types as seen by the cart.

use crate::error::CommerceError;
use crate::ids::{ExtraId, ProductId, SizeId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Quantity limit applied when a product doesn't specify one.
pub const DEFAULT_QUANTITY_LIMIT: u32 = 1;

fn default_quantity_limit() -> u32 {
    DEFAULT_QUANTITY_LIMIT
}

/// A purchasable product with its configurable options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price before any size or extra.
    pub base_price: Money,
    /// Image URI.
    #[serde(default)]
    pub image: String,
    /// Maximum units of this product a single cart may hold.
    #[serde(default = "default_quantity_limit")]
    pub quantity_limit: u32,
    /// Sizes to choose from (at most one per line).
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    /// Extras to choose from (any subset per line).
    #[serde(default)]
    pub extras: Vec<ExtraOption>,
}

impl Product {
    /// Create a product with no options and the default quantity limit.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, base_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price,
            image: String::new(),
            quantity_limit: DEFAULT_QUANTITY_LIMIT,
            sizes: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// Set the quantity limit.
    pub fn with_quantity_limit(mut self, limit: u32) -> Self {
        self.quantity_limit = limit;
        self
    }

    /// Set the image URI.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Add a size option.
    pub fn with_size(
        mut self,
        id: impl Into<SizeId>,
        name: impl Into<String>,
        price_delta_cents: i64,
    ) -> Self {
        let delta = Money::new(price_delta_cents, self.base_price.currency);
        self.sizes.push(SizeOption {
            id: id.into(),
            name: name.into(),
            price_delta: delta,
        });
        self
    }

    /// Add an extra option.
    pub fn with_extra(
        mut self,
        id: impl Into<ExtraId>,
        name: impl Into<String>,
        price_delta_cents: i64,
    ) -> Self {
        let delta = Money::new(price_delta_cents, self.base_price.currency);
        self.extras.push(ExtraOption {
            id: id.into(),
            name: name.into(),
            price_delta: delta,
        });
        self
    }

    /// Currency this product is priced in.
    pub fn currency(&self) -> Currency {
        self.base_price.currency
    }

    /// Look up a size by ID.
    pub fn size(&self, id: &SizeId) -> Option<&SizeOption> {
        self.sizes.iter().find(|s| &s.id == id)
    }

    /// Look up an extra by ID.
    pub fn extra(&self, id: &ExtraId) -> Option<&ExtraOption> {
        self.extras.iter().find(|e| &e.id == id)
    }

    /// Check the product data is fit to price.
    ///
    /// Rejects negative prices or deltas, a zero quantity limit, options in a
    /// foreign currency, and duplicate option IDs.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let bad = |what: String| {
            Err(CommerceError::InvariantViolation(format!(
                "product {}: {}",
                self.id, what
            )))
        };

        if self.base_price.is_negative() {
            return bad(format!("negative base price {}", self.base_price.amount_cents));
        }
        if self.quantity_limit == 0 {
            return bad("quantity limit must be at least 1".to_string());
        }

        for (i, size) in self.sizes.iter().enumerate() {
            if size.price_delta.is_negative() {
                return bad(format!("size {} has a negative price delta", size.id));
            }
            if size.price_delta.currency != self.currency() {
                return bad(format!("size {} is priced in {}", size.id, size.price_delta.currency));
            }
            if self.sizes[..i].iter().any(|s| s.id == size.id) {
                return bad(format!("duplicate size {}", size.id));
            }
        }

        for (i, extra) in self.extras.iter().enumerate() {
            if extra.price_delta.is_negative() {
                return bad(format!("extra {} has a negative price delta", extra.id));
            }
            if extra.price_delta.currency != self.currency() {
                return bad(format!("extra {} is priced in {}", extra.id, extra.price_delta.currency));
            }
            if self.extras[..i].iter().any(|e| e.id == extra.id) {
                return bad(format!("duplicate extra {}", extra.id));
            }
        }

        Ok(())
    }
}

/// A size choice (e.g. Small / Medium / Large).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizeOption {
    pub id: SizeId,
    pub name: String,
    /// Added to the base price when this size is selected.
    pub price_delta: Money,
}

/// An optional add-on (e.g. extra cheese).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraOption {
    pub id: ExtraId,
    pub name: String,
    /// Added to the unit price when this extra is selected.
    pub price_delta: Money,
}
