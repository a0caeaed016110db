//! Catalog snapshot module.
//!
//! Products, their size and extra options, and the read-only lookup the
//! cart and pricing engine use.

mod product;
mod snapshot;

pub use product::{ExtraOption, Product, SizeOption, DEFAULT_QUANTITY_LIMIT};
pub use snapshot::{CatalogSnapshot, InMemoryCatalog};
