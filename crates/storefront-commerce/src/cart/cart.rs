//! Cart and cart line types.

use crate::ids::{ExtraId, ProductId, SizeId};
use serde::{Deserialize, Serialize};

/// A shopper's cart: one line per product, in insertion order.
///
/// Read access is public. Mutation is crate-private and goes through
/// [`CartStore`](crate::cart::CartStore), which enforces limits and persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines (the header badge count).
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Units held for one product, zero if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// Structural check used when rehydrating: positive quantities, one line
    /// per product, each extra at most once.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.lines.iter().enumerate().all(|(i, line)| {
            line.quantity >= 1
                && !self.lines[..i].iter().any(|l| l.product_id == line.product_id)
                && line
                    .extras
                    .iter()
                    .enumerate()
                    .all(|(j, e)| !line.extras[..j].contains(e))
        })
    }

    pub(crate) fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == product_id)
    }

    pub(crate) fn push(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Remove the line for a product, returning whether one existed.
    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() < len_before
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}

/// One product's configuration and quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    /// Product this line is for. Unique within a cart.
    pub product_id: ProductId,
    /// Units, always within `1..=quantity_limit`.
    pub quantity: u32,
    /// Selected size, if the product offers sizes.
    #[serde(default)]
    pub size: Option<SizeId>,
    /// Selected extras, each at most once.
    #[serde(default)]
    pub extras: Vec<ExtraId>,
}

impl CartLine {
    /// A fresh line with quantity 1.
    pub fn new(product_id: ProductId, size: Option<SizeId>, extras: Vec<ExtraId>) -> Self {
        Self {
            product_id,
            quantity: 1,
            size,
            extras,
        }
    }
}
