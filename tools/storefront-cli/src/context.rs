//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storefront_cache::FileStore;
use storefront_commerce::cart::{CartStore, PricingPolicy};
use storefront_commerce::catalog::InMemoryCatalog;
use storefront_pay::HostedCheckoutClient;

use crate::catalog::CatalogFile;
use crate::config::{StorefrontConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: StorefrontConfig,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => {
                let path = cwd.join(path);
                (StorefrontConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (StorefrontConfig::default(), None),
            },
        };
        config.apply_env();

        match &config_path {
            Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
            None => tracing::debug!("no config file found, using defaults"),
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path())
    }

    /// Resolve a config path relative to the config file's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir().join(path)
        }
    }

    /// Load and validate the product catalog.
    pub fn catalog(&self) -> Result<InMemoryCatalog> {
        let path = self.resolve_path(&self.config.catalog.path);
        CatalogFile::load(&path)?.into_catalog(self.config.currency()?)
    }

    /// Open the persisted cart.
    pub fn cart_store(&self) -> Result<CartStore<FileStore>> {
        let dir = self.resolve_path(&self.config.storage.dir);
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open storage: {}", dir.display()))?;
        Ok(CartStore::open(store))
    }

    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        self.config.pricing_policy()
    }

    /// Build the payment gateway client.
    pub fn gateway(&self) -> Result<HostedCheckoutClient> {
        HostedCheckoutClient::new(self.config.gateway.clone())
            .context("Payment gateway is misconfigured")
    }
}

/// Find a config file in the directory tree, nearest first.
fn find_config(start: &Path) -> Option<(PathBuf, StorefrontConfig)> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES.iter().find_map(|name| {
            let path = dir.join(name);
            if !path.exists() {
                return None;
            }
            match StorefrontConfig::load(&path) {
                Ok(config) => Some((path, config)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "skipping unreadable config");
                    None
                }
            }
        })
    })
}
