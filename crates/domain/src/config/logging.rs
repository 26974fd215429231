use super::ConfigError;
use serde::{Deserialize, Serialize};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// `[logging]` section. Diagnostics go to stderr; the run report to stdout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (default: "info")
    /// Options: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(ConfigError::Validation(format!(
                "Invalid log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            )))
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
