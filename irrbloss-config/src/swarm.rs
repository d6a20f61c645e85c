//! Crowd composition and lifecycle parameters.
//!
//! Everything that shapes who the virtual devices are and how fast the
//! population turns over.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

/// Vendor-category weights for identity generation. Relative weights over
/// their own sum, not percentages.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct WeightsConfig {
    #[serde(default = "default_weight_apple")]
    #[validate(range(max = 1000))]
    pub apple: u32,

    #[serde(default = "default_weight_samsung")]
    #[validate(range(max = 1000))]
    pub samsung: u32,

    #[serde(default = "default_weight_legacy_iot")]
    #[validate(range(max = 1000))]
    pub legacy_iot: u32,

    #[serde(default = "default_weight_modern_generic")]
    #[validate(range(max = 1000))]
    pub modern_generic: u32,
}

fn default_weight_apple() -> u32 {
    40
}

fn default_weight_samsung() -> u32 {
    35
}

fn default_weight_legacy_iot() -> u32 {
    7
}

fn default_weight_modern_generic() -> u32 {
    18
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            apple: default_weight_apple(),
            samsung: default_weight_samsung(),
            legacy_iot: default_weight_legacy_iot(),
            modern_generic: default_weight_modern_generic(),
        }
    }
}

/// Swarm configuration: identity demographics, pool sizing, churn cadence,
/// corpus limits and the memory-pressure thresholds.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validate_swarm))]
pub struct SwarmConfig {
    #[validate(nested)]
    #[serde(default)]
    pub weights: WeightsConfig,

    /// Active pool size target.
    #[serde(default = "default_active_target")]
    #[validate(range(min = 10, max = 50000))]
    pub active_target: usize,

    /// Dormant pool size target.
    #[serde(default = "default_dormant_target")]
    #[validate(range(min = 10, max = 100000))]
    pub dormant_target: usize,

    /// Lifecycle burst interval bounds (milliseconds, half-open).
    #[serde(default = "default_lifecycle_min_ms")]
    #[validate(range(min = 100, max = 600000))]
    pub lifecycle_min_ms: u64,

    #[serde(default = "default_lifecycle_max_ms")]
    #[validate(range(min = 100, max = 600000))]
    pub lifecycle_max_ms: u64,

    /// Churn steps per lifecycle burst (half-open).
    #[serde(default = "default_churn_burst_min")]
    #[validate(range(min = 1, max = 100))]
    pub churn_burst_min: u32,

    #[serde(default = "default_churn_burst_max")]
    #[validate(range(min = 2, max = 200))]
    pub churn_burst_max: u32,

    /// Share of admissions served by reviving a dormant device.
    #[serde(default = "default_revive_pct")]
    #[validate(range(max = 100))]
    pub revive_pct: u8,

    /// Quarter-dBm power levels a fresh device picks from.
    #[serde(default = "default_power_levels")]
    #[validate(length(min = 1), custom(function = validate_power_levels))]
    pub power_levels: Vec<i8>,

    #[serde(default = "default_private_mac_modern_pct")]
    #[validate(range(max = 100))]
    pub private_mac_modern_pct: u8,

    #[serde(default = "default_private_mac_common_pct")]
    #[validate(range(max = 100))]
    pub private_mac_common_pct: u8,

    #[serde(default = "default_preferred_ssid_legacy_pct")]
    #[validate(range(max = 100))]
    pub preferred_ssid_legacy_pct: u8,

    #[serde(default = "default_preferred_ssid_default_pct")]
    #[validate(range(max = 100))]
    pub preferred_ssid_default_pct: u8,

    /// SSID corpus entry cap.
    #[serde(default = "default_corpus_max")]
    #[validate(range(min = 30, max = 4096))]
    pub corpus_max: usize,

    /// Minimum spacing between corpus overwrites once full (seconds).
    #[serde(default = "default_corpus_min_learn_interval_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub corpus_min_learn_interval_secs: u64,

    /// Free-memory watermarks in bytes.
    #[serde(default = "default_memory_high_water")]
    pub memory_high_water: u64,

    #[serde(default = "default_memory_low_water")]
    pub memory_low_water: u64,

    /// Fractions shed from each pool under pressure.
    #[serde(default = "default_dormant_shed")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub dormant_shed: f64,

    #[serde(default = "default_active_shed")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub active_shed: f64,

    /// Initial population stops once free memory drops below this (bytes).
    #[serde(default = "default_populate_floor")]
    pub populate_floor: u64,
}

fn validate_swarm(config: &SwarmConfig) -> Result<(), ValidationError> {
    if config.lifecycle_min_ms >= config.lifecycle_max_ms {
        return Err(ValidationError::new("lifecycle_bounds_inverted"));
    }
    if config.churn_burst_min >= config.churn_burst_max {
        return Err(ValidationError::new("churn_bounds_inverted"));
    }
    if config.memory_low_water >= config.memory_high_water {
        return Err(ValidationError::new("memory_watermarks_inverted"));
    }
    Ok(())
}

fn validate_power_levels(levels: &[i8]) -> Result<(), ValidationError> {
    if levels.iter().all(|l| (8..=84).contains(l)) {
        Ok(())
    } else {
        Err(ValidationError::new("power_level_out_of_range"))
    }
}

fn default_active_target() -> usize {
    1500
}

fn default_dormant_target() -> usize {
    3000
}

fn default_lifecycle_min_ms() -> u64 {
    1980
}

fn default_lifecycle_max_ms() -> u64 {
    3960
}

fn default_churn_burst_min() -> u32 {
    3
}

fn default_churn_burst_max() -> u32 {
    8
}

fn default_revive_pct() -> u8 {
    50
}

fn default_power_levels() -> Vec<i8> {
    vec![72, 74, 76, 78, 80, 82]
}

fn default_private_mac_modern_pct() -> u8 {
    85
}

fn default_private_mac_common_pct() -> u8 {
    50
}

fn default_preferred_ssid_legacy_pct() -> u8 {
    90
}

fn default_preferred_ssid_default_pct() -> u8 {
    60
}

fn default_corpus_max() -> usize {
    100
}

fn default_corpus_min_learn_interval_secs() -> u64 {
    30
}

fn default_memory_high_water() -> u64 {
    25_000
}

fn default_memory_low_water() -> u64 {
    15_000
}

fn default_dormant_shed() -> f64 {
    0.30
}

fn default_active_shed() -> f64 {
    0.15
}

fn default_populate_floor() -> u64 {
    20_000
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            active_target: default_active_target(),
            dormant_target: default_dormant_target(),
            lifecycle_min_ms: default_lifecycle_min_ms(),
            lifecycle_max_ms: default_lifecycle_max_ms(),
            churn_burst_min: default_churn_burst_min(),
            churn_burst_max: default_churn_burst_max(),
            revive_pct: default_revive_pct(),
            power_levels: default_power_levels(),
            private_mac_modern_pct: default_private_mac_modern_pct(),
            private_mac_common_pct: default_private_mac_common_pct(),
            preferred_ssid_legacy_pct: default_preferred_ssid_legacy_pct(),
            preferred_ssid_default_pct: default_preferred_ssid_default_pct(),
            corpus_max: default_corpus_max(),
            corpus_min_learn_interval_secs: default_corpus_min_learn_interval_secs(),
            memory_high_water: default_memory_high_water(),
            memory_low_water: default_memory_low_water(),
            dormant_shed: default_dormant_shed(),
            active_shed: default_active_shed(),
            populate_floor: default_populate_floor(),
        }
    }
}
