//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;

use anyhow::anyhow;
use clap::{Args, Subcommand};
use storefront_commerce::{CommerceError, ErrorKind};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Add one unit of a product (replaces its size and extras).
    Add {
        /// Product ID.
        product: String,

        /// Size ID.
        #[arg(short, long)]
        size: Option<String>,

        /// Extra ID (repeatable).
        #[arg(short, long = "extra")]
        extras: Vec<String>,
    },
    /// Remove one unit of a product.
    Dec {
        /// Product ID.
        product: String,
    },
    /// Remove a product's line entirely.
    Remove {
        /// Product ID.
        product: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the priced cart.
    Show,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Street address.
    #[arg(long)]
    pub address: Option<String>,

    /// City.
    #[arg(long)]
    pub city: Option<String>,

    /// Country.
    #[arg(long)]
    pub country: Option<String>,

    /// Signed-in buyer's profile (JSON) to prefill shipping from.
    #[arg(long)]
    pub profile: Option<String>,

    /// Never prompt for missing shipping fields.
    #[arg(long)]
    pub no_input: bool,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List products with their options and limits.
    List,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file and sample catalog.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file and catalog.
    Validate,
}

/// Turn a core error into what the shopper sees.
///
/// Internal errors are logged in full and reported generically.
pub(crate) fn shopper_error(e: CommerceError) -> anyhow::Error {
    if e.kind() == ErrorKind::Internal {
        tracing::error!(error = ?e, "operation failed");
    }
    anyhow!(e.user_message())
}
