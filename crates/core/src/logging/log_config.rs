use crate::config::ObservabilityConfig;
use crate::logging::log_level::LogLevel;

/// Output format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    Json,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: OutputFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: OutputFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Configuration from `LOG_LEVEL` and `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.level = LogLevel::from_env();

        if let Ok(format_str) = std::env::var("LOG_FORMAT") {
            config.format = match format_str.to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Pretty,
            };
        }

        config
    }

    pub fn from_observability(
        observability: &ObservabilityConfig,
    ) -> crate::AssignmentResult<Self> {
        let level = observability.log_level.parse::<LogLevel>()?;
        let format = match observability.log_format.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "pretty" => OutputFormat::Pretty,
            other => {
                return Err(crate::AssignmentError::config_error(format!(
                    "Invalid log format: {other}"
                )))
            }
        };
        Ok(Self { level, format })
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
