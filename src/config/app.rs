//! Application settings loading from config.toml
//!
//! Every field has a default, so a missing or partial `config.toml` is valid. The
//! path can be overridden with the `PANTRY_CONFIG` environment variable.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum number of notifications shown in a feed
    pub feed_limit: u64,
    /// How long a family invitation stays redeemable
    pub invitation_ttl_days: i64,
    /// Site the invitation link points at; `/join-family?token=...` is appended
    pub invite_base_url: String,
    /// Expiry lead time for users without saved settings
    pub default_expiry_reminder_days: i32,
    /// Warranty lead time for users without saved settings
    pub default_warranty_reminder_days: i32,
    /// Minutes between background reminder promotion runs
    pub promotion_interval_minutes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_limit: crate::core::notification::DEFAULT_FEED_LIMIT,
            invitation_ttl_days: crate::core::family::DEFAULT_INVITATION_TTL_DAYS,
            invite_base_url: "https://pantry.example.com".to_string(),
            default_expiry_reminder_days: crate::core::settings::DEFAULT_EXPIRY_REMINDER_DAYS,
            default_warranty_reminder_days: crate::core::settings::DEFAULT_WARRANTY_REMINDER_DAYS,
            promotion_interval_minutes: 60,
        }
    }
}

impl AppConfig {
    /// Rejects values that would make the rest of the system misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.feed_limit == 0 {
            return Err(Error::Config {
                message: "feed_limit must be at least 1".to_string(),
            });
        }
        if self.invitation_ttl_days <= 0 {
            return Err(Error::Config {
                message: "invitation_ttl_days must be positive".to_string(),
            });
        }
        if self.default_expiry_reminder_days <= 0 || self.default_warranty_reminder_days <= 0 {
            return Err(Error::Config {
                message: "default reminder days must be positive".to_string(),
            });
        }
        if self.promotion_interval_minutes == 0 {
            return Err(Error::Config {
                message: "promotion_interval_minutes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from `PANTRY_CONFIG` or `./config.toml`, falling back to
/// defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("PANTRY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        tracing::debug!("Loading configuration from {}", path);
        load_config(&path)
    } else {
        tracing::info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}
