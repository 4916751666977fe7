//! Configuration file support for iam-scan.
//!
//! Provides YAML-based configuration through `iam-scan.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use iam_scan::shared::security::read_input_file;
use iam_scan::shared::Result;

pub const CONFIG_FILENAME: &str = "iam-scan.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Rule book path
    pub rules: Option<PathBuf>,
    /// Directory holding `<model_name>.json` inventory snapshots
    pub inventory: Option<PathBuf>,
    pub model_name: Option<String>,
    pub output_path: Option<PathBuf>,
    /// JSON-lines file receiving violation rows
    pub violations_db: Option<PathBuf>,
    pub email_sender: Option<String>,
    pub email_recipient: Option<String>,
    pub sendgrid_api_key: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = read_input_file(path, "config file").with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(model_name) = &config.model_name {
        if model_name.trim().is_empty() {
            bail!(
                "Invalid config: model_name must not be empty.\n\n\
                 💡 Hint: Remove the field or name an existing data model."
            );
        }
    }

    for (field, value) in [
        ("email_sender", &config.email_sender),
        ("email_recipient", &config.email_recipient),
    ] {
        if let Some(address) = value {
            if !looks_like_email(address) {
                bail!(
                    "Invalid config: {} '{}' is not an email address.\n\n\
                     💡 Hint: Use a full address such as \"security@example.com\".",
                    field,
                    address
                );
            }
        }
    }

    if let Some(key) = &config.sendgrid_api_key {
        if key.trim().is_empty() {
            bail!("Invalid config: sendgrid_api_key must not be empty.");
        }
    }
    Ok(())
}

/// Minimal shape check: one `@` with text on both sides
pub fn looks_like_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
