//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, generate_sample_catalog, SECRET_ENV_VAR};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.config.redacted();

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("currency", &config.store.currency);
    ctx.output
        .kv("delivery_fee_cents", &config.store.delivery_fee_cents.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &config.storage.dir);

    ctx.output.info("");
    ctx.output.info("[catalog]");
    ctx.output.kv("path", &config.catalog.path);

    ctx.output.info("");
    ctx.output.info("[gateway]");
    ctx.output.kv("base_url", &config.gateway.base_url);
    ctx.output.kv(
        "secret_key",
        if config.gateway.has_secret() {
            &config.gateway.secret_key
        } else {
            "(not set)"
        },
    );
    ctx.output.kv("success_url", &config.gateway.success_url);
    ctx.output.kv("cancel_url", &config.gateway.cancel_url);
    if let Some(ref base) = config.gateway.hosted_page_base {
        ctx.output.kv("hosted_page_base", base);
    }
    ctx.output
        .kv("timeout_secs", &config.gateway.timeout_secs.to_string());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("storefront.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    let catalog_path = ctx.cwd.join("catalog.toml");
    if catalog_path.exists() {
        ctx.output
            .info(&format!("Keeping existing catalog: {}", catalog_path.display()));
    } else {
        fs::write(&catalog_path, generate_sample_catalog())?;
        ctx.output
            .success(&format!("Created: {}", catalog_path.display()));
    }

    ctx.output.info(&format!(
        "Set {} before running `storefront checkout`.",
        SECRET_ENV_VAR
    ));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (mut errors, warnings) = ctx.config.check();

    match ctx.catalog() {
        Ok(catalog) if catalog.is_empty() => {
            errors.push("catalog has no products".to_string());
        }
        Ok(catalog) => ctx
            .output
            .info(&format!("Catalog: {} products", catalog.len())),
        Err(e) => errors.push(format!("{:#}", e)),
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output
        .success("Configuration is valid (with warnings)");

    Ok(())
}
