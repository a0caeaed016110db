//! Catalog file loading.
//!
//! The file lists products with prices in cents; the store currency comes
//! from config so one file can't mix currencies.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use storefront_commerce::catalog::{InMemoryCatalog, Product, DEFAULT_QUANTITY_LIMIT};
use storefront_commerce::{Currency, Money};

/// On-disk catalog.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_quantity_limit")]
    pub quantity_limit: u32,
    #[serde(default)]
    pub sizes: Vec<OptionEntry>,
    #[serde(default)]
    pub extras: Vec<OptionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OptionEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price_cents: i64,
}

fn default_quantity_limit() -> u32 {
    DEFAULT_QUANTITY_LIMIT
}

impl CatalogFile {
    /// Parse TOML, or JSON when the path ends in `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::parse(&content, path.extension().is_some_and(|e| e == "json"))
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    fn parse(content: &str, json: bool) -> Result<Self> {
        Ok(if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        })
    }

    /// Build a validated in-memory catalog priced in `currency`.
    pub fn into_catalog(self, currency: Currency) -> Result<InMemoryCatalog> {
        let products = self
            .products
            .into_iter()
            .map(|entry| entry.into_product(currency))
            .collect();
        InMemoryCatalog::new(products).context("Catalog failed validation")
    }
}

impl ProductEntry {
    fn into_product(self, currency: Currency) -> Product {
        let product = Product::new(self.id, self.name, Money::new(self.price_cents, currency))
            .with_quantity_limit(self.quantity_limit)
            .with_image(self.image);
        let product = self
            .sizes
            .into_iter()
            .fold(product, |p, s| p.with_size(s.id, s.name, s.price_cents));
        self.extras
            .into_iter()
            .fold(product, |p, e| p.with_extra(e.id, e.name, e.price_cents))
    }
}
