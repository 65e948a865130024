use anyhow::{Context, Result};
use snuffy_core::{AppConfig, LogConfig, OutputFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("failed to initialise JSON logging")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("failed to initialise pretty logging")?;
        }
        _ => {
            return Err(anyhow::anyhow!("unsupported log format: {log_format}"));
        }
    }

    Ok(())
}

pub fn init_logging_from(config: &LogConfig) -> Result<()> {
    let format = match config.format {
        OutputFormat::Json => "json",
        OutputFormat::Pretty => "pretty",
    };
    init_logging(config.level.as_directive(), format)
}

/// Load configuration, requiring the file to exist when a path is given.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    if let Some(path) = config_path {
        if !std::path::Path::new(path).exists() {
            return Err(anyhow::anyhow!("config file not found: {path}"));
        }
    }

    AppConfig::load(config_path).with_context(|| match config_path {
        Some(path) => format!("failed to load config from {path}"),
        None => "failed to load default config".to_string(),
    })
}
