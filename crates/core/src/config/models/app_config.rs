use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{assignment::AssignmentConfig, observability::ObservabilityConfig};

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assignment: AssignmentConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a config file and environment variables
    ///
    /// Load order:
    /// 1. Built-in defaults
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: SNUFFY_, nested with `__`,
    ///    e.g. `SNUFFY_ASSIGNMENT__MAX_OFFER_ATTEMPTS=4`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default(
                "assignment.caretaker_min_distance_km",
                defaults.assignment.caretaker_min_distance_km,
            )?
            .set_default(
                "assignment.walker_proximity_weight",
                defaults.assignment.walker_proximity_weight,
            )?
            .set_default(
                "assignment.walker_rating_weight",
                defaults.assignment.walker_rating_weight,
            )?
            .set_default(
                "assignment.default_walker_rating",
                defaults.assignment.default_walker_rating,
            )?
            .set_default("assignment.max_rating", defaults.assignment.max_rating)?
            .set_default(
                "assignment.max_offer_attempts",
                defaults.assignment.max_offer_attempts as i64,
            )?
            .set_default(
                "observability.log_level",
                defaults.observability.log_level.as_str(),
            )?
            .set_default(
                "observability.log_format",
                defaults.observability.log_format.as_str(),
            )?
            .set_default(
                "observability.metrics_enabled",
                defaults.observability.metrics_enabled,
            )?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("config file not found: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            let default_paths = ["config/snuffy.toml", "snuffy.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SNUFFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("failed to parse TOML config")?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }

    pub fn validate(&self) -> Result<()> {
        self.assignment
            .validate()
            .context("assignment config validation failed")?;

        self.observability
            .validate()
            .context("observability config validation failed")?;

        Ok(())
    }
}
