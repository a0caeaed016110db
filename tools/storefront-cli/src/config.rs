//! CLI configuration.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use storefront_commerce::{cart::PricingPolicy, Currency, Money};
use storefront_pay::HostedCheckoutConfig;

/// Environment variable that overrides `gateway.secret_key`.
pub const SECRET_ENV_VAR: &str = "STOREFRONT_GATEWAY_SECRET";

/// Config file names searched for, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Store-wide pricing settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Where the cart is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Product catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Payment gateway settings.
    #[serde(default)]
    pub gateway: HostedCheckoutConfig,
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_secret_override(std::env::var(SECRET_ENV_VAR).ok());
    }

    fn apply_secret_override(&mut self, secret: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.trim().is_empty()) {
            self.gateway.secret_key = secret;
        }
    }

    /// Store currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.store.currency)
            .ok_or_else(|| anyhow!("Unsupported currency: {}", self.store.currency))
    }

    /// Pricing policy built from `[store]`.
    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        if self.store.delivery_fee_cents < 0 {
            return Err(anyhow!(
                "store.delivery_fee_cents must not be negative (got {})",
                self.store.delivery_fee_cents
            ));
        }
        Ok(PricingPolicy::new(Money::new(
            self.store.delivery_fee_cents,
            self.currency()?,
        )))
    }

    /// A copy safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gateway.has_secret() {
            copy.gateway.secret_key = "<redacted>".to_string();
        }
        copy
    }

    /// Errors that make the config unusable, then warnings.
    pub fn check(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = self.pricing_policy() {
            errors.push(e.to_string());
        }
        if self.storage.dir.trim().is_empty() {
            errors.push("storage.dir is required".to_string());
        }
        if self.catalog.path.trim().is_empty() {
            errors.push("catalog.path is required".to_string());
        }

        // Cart commands work without a gateway, so gateway problems only warn.
        warnings.extend(self.gateway.problems());

        (errors, warnings)
    }
}

/// Store-wide pricing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// ISO currency code for the whole store.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Flat delivery fee added to every order.
    #[serde(default = "default_delivery_fee_cents")]
    pub delivery_fee_cents: i64,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_delivery_fee_cents() -> i64 {
    storefront_commerce::cart::DEFAULT_DELIVERY_FEE_CENTS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            delivery_fee_cents: default_delivery_fee_cents(),
        }
    }
}

/// Cart persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted cart and order drafts.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

fn default_storage_dir() -> String {
    ".storefront".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Catalog source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML or JSON product list.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "catalog.toml".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

/// Generate a default storefront.toml.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront configuration

[store]
currency = "USD"
delivery_fee_cents = {fee}

[storage]
dir = ".storefront"

[catalog]
path = "catalog.toml"

[gateway]
base_url = "https://api.stripe.com"
# Prefer the {env} environment variable over writing the key here.
# secret_key = "sk_test_..."
success_url = "http://localhost:3000/stripe/purchase-success?session_id={{CHECKOUT_SESSION_ID}}"
cancel_url = "http://localhost:3000/cart"
timeout_secs = 30
"#,
        fee = default_delivery_fee_cents(),
        env = SECRET_ENV_VAR,
    )
}

/// Generate a sample catalog.toml.
pub fn generate_sample_catalog() -> String {
    r#"# Products offered by the store. Prices are in cents.

[[products]]
id = "margherita"
name = "Margherita"
price_cents = 1000
image = "/images/margherita.png"
quantity_limit = 5

[[products.sizes]]
id = "small"
name = "Small"
price_cents = 0

[[products.sizes]]
id = "large"
name = "Large"
price_cents = 200

[[products.extras]]
id = "cheese"
name = "Extra cheese"
price_cents = 150

[[products.extras]]
id = "olives"
name = "Olives"
price_cents = 100

[[products]]
id = "cola"
name = "Cola"
price_cents = 300
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: StorefrontConfig = toml::from_str("[store]\ncurrency = \"EUR\"\n").unwrap();
        assert_eq!(config.store.currency, "EUR");
        assert_eq!(config.store.delivery_fee_cents, 500);
        assert_eq!(config.storage.dir, ".storefront");
        assert_eq!(config.catalog.path, "catalog.toml");
        assert_eq!(config.gateway.timeout_secs, 30);
    }

    #[test]
    fn test_generated_config_parses() {
        let config: StorefrontConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.pricing_policy().unwrap().delivery_fee.amount_cents, 500);
        assert!(config.gateway.success_url.contains("{CHECKOUT_SESSION_ID}"));

        let (errors, warnings) = config.check();
        assert!(errors.is_empty());
        // Only the missing secret.
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.store.delivery_fee_cents = 250;

        let toml_path = dir.path().join("storefront.toml");
        std::fs::write(&toml_path, toml::to_string_pretty(&config).unwrap()).unwrap();
        let json_path = dir.path().join("storefront.json");
        std::fs::write(&json_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        for path in [toml_path, json_path] {
            let loaded = StorefrontConfig::load(&path).unwrap();
            assert_eq!(loaded.store.delivery_fee_cents, 250);
        }
    }

    #[test]
    fn test_secret_override() {
        let mut config = StorefrontConfig::default();
        config.apply_secret_override(Some("sk_env".into()));
        assert_eq!(config.gateway.secret_key, "sk_env");

        config.apply_secret_override(Some("   ".into()));
        assert_eq!(config.gateway.secret_key, "sk_env");
    }

    #[test]
    fn test_invalid_store_settings() {
        let mut config = StorefrontConfig::default();
        config.store.currency = "XYZ".into();
        assert!(config.currency().is_err());

        config.store.currency = "USD".into();
        config.store.delivery_fee_cents = -1;
        let (errors, _) = config.check();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_redacted_hides_secret() {
        let mut config = StorefrontConfig::default();
        config.gateway.secret_key = "sk_live_abc".into();
        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("sk_live_abc"));
    }
}
