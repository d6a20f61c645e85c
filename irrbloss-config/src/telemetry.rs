//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TelemetryConfig {
    /// Log level: trace, debug, info, warn or error.
    #[serde(default = "default_log_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    #[validate(custom(function = validation::validate_log_format))]
    pub log_format: String,

    /// Status snapshot interval (seconds).
    #[serde(default = "default_snapshot_interval_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub snapshot_interval_secs: u64,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_snapshot_interval_secs() -> u64 {
    2
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            snapshot_interval_secs: default_snapshot_interval_secs(),
        }
    }
}
