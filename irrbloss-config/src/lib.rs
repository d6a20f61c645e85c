//! # irrbloss-config
//!
//! Layered configuration for every irrbloss component. One root container,
//! loaded defaults → YAML file → `IRRBLOSS_*` environment, validated as a
//! whole before anything starts. All values are read once at startup; there
//! is no hot reload.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod features;
mod radio;
mod relay;
mod swarm;
mod telemetry;
mod traffic;
mod validation;

pub use error::ConfigError;
pub use features::FeatureConfig;
pub use radio::RadioConfig;
pub use relay::RelayConfig;
pub use swarm::{SwarmConfig, WeightsConfig};
pub use telemetry::TelemetryConfig;
pub use traffic::TrafficConfig;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct IrrblossConfig {
    /// Crowd demographics, pool sizing, corpus and memory policy.
    #[validate(nested)]
    #[serde(default)]
    pub swarm: SwarmConfig,

    /// Hop cadence, dwell sizing and pacing ranges.
    #[validate(nested)]
    #[serde(default)]
    pub traffic: TrafficConfig,

    /// Interface, band plans and the mesh channel.
    #[validate(nested)]
    #[serde(default)]
    pub radio: RadioConfig,

    /// Mesh relay filter, cache and listen cadence.
    #[validate(nested)]
    #[serde(default)]
    pub relay: RelayConfig,

    /// Behavior switches.
    #[validate(nested)]
    #[serde(default)]
    pub features: FeatureConfig,

    /// Logging and snapshot cadence.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl IrrblossConfig {
    /// Load configuration from default locations and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/irrbloss.yaml`, if present
    /// 3. `IRRBLOSS_*` environment variables (`__` separates nesting)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(IrrblossConfig::default()));

        if Path::new("config/irrbloss.yaml").exists() {
            figment = figment.merge(Yaml::file("config/irrbloss.yaml"));
        }

        figment
            .merge(Env::prefixed("IRRBLOSS_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(IrrblossConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("IRRBLOSS_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
