//! Transmit-shape parameters.
//!
//! Hop cadence, dwell sizing, the rare-event probabilities and every pause
//! range used to pace frames inside a dwell. All `_min`/`_max` pairs are
//! half-open sampling bounds.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validate_traffic))]
pub struct TrafficConfig {
    /// Channel hop interval bounds (milliseconds).
    #[serde(default = "default_hop_min_ms")]
    #[validate(range(min = 10, max = 60000))]
    pub hop_min_ms: u64,

    #[serde(default = "default_hop_max_ms")]
    #[validate(range(min = 20, max = 120000))]
    pub hop_max_ms: u64,

    /// Transmit slots per dwell.
    #[serde(default = "default_slots_min")]
    #[validate(range(min = 1, max = 1000))]
    pub slots_min: u32,

    #[serde(default = "default_slots_max")]
    #[validate(range(min = 2, max = 2000))]
    pub slots_max: u32,

    /// Probability of a full auth/assoc/data interaction per slot.
    #[serde(default = "default_interaction_pct")]
    #[validate(range(max = 100))]
    pub interaction_pct: u8,

    /// Probability of an ambient beacon per slot.
    #[serde(default = "default_beacon_pct")]
    #[validate(range(max = 100))]
    pub beacon_pct: u8,

    /// Probability of skipping sequence numbers after a probe.
    #[serde(default = "default_sequence_gap_pct")]
    #[validate(range(max = 100))]
    pub sequence_gap_pct: u8,

    /// Sequence gap step bounds.
    #[serde(default = "default_gap_step_min")]
    #[validate(range(min = 2, max = 100))]
    pub gap_step_min: u16,

    #[serde(default = "default_gap_step_max")]
    #[validate(range(min = 3, max = 200))]
    pub gap_step_max: u16,

    /// Pause after an authentication frame (milliseconds).
    #[serde(default = "default_auth_pause_min_ms")]
    pub auth_pause_min_ms: u64,

    #[serde(default = "default_auth_pause_max_ms")]
    pub auth_pause_max_ms: u64,

    /// Pause after an association request (milliseconds).
    #[serde(default = "default_assoc_pause_min_ms")]
    pub assoc_pause_min_ms: u64,

    #[serde(default = "default_assoc_pause_max_ms")]
    pub assoc_pause_max_ms: u64,

    /// Encrypted data frames per interaction.
    #[serde(default = "default_data_burst_min")]
    #[validate(range(min = 1, max = 100))]
    pub data_burst_min: u32,

    #[serde(default = "default_data_burst_max")]
    #[validate(range(min = 2, max = 200))]
    pub data_burst_max: u32,

    /// Pause between data frames (milliseconds).
    #[serde(default = "default_data_pause_min_ms")]
    pub data_pause_min_ms: u64,

    #[serde(default = "default_data_pause_max_ms")]
    pub data_pause_max_ms: u64,

    /// Noise window after every slot (milliseconds).
    #[serde(default = "default_slot_noise_min_ms")]
    pub slot_noise_min_ms: u64,

    #[serde(default = "default_slot_noise_max_ms")]
    pub slot_noise_max_ms: u64,

    /// Noise transmit power floor and upward jitter (quarter-dBm).
    #[serde(default = "default_noise_power_floor")]
    #[validate(range(min = 8, max = 84))]
    pub noise_power_floor: i8,

    #[serde(default = "default_noise_power_jitter")]
    #[validate(range(max = 16))]
    pub noise_power_jitter: i8,

    /// Spacing between individual noise frames (microseconds).
    #[serde(default = "default_noise_spacing_min_us")]
    #[validate(range(min = 50, max = 100000))]
    pub noise_spacing_min_us: u64,

    #[serde(default = "default_noise_spacing_max_us")]
    #[validate(range(min = 100, max = 200000))]
    pub noise_spacing_max_us: u64,
}

fn validate_traffic(config: &TrafficConfig) -> Result<(), ValidationError> {
    let pairs = [
        (config.hop_min_ms, config.hop_max_ms),
        (config.slots_min as u64, config.slots_max as u64),
        (config.gap_step_min as u64, config.gap_step_max as u64),
        (config.auth_pause_min_ms, config.auth_pause_max_ms),
        (config.assoc_pause_min_ms, config.assoc_pause_max_ms),
        (config.data_burst_min as u64, config.data_burst_max as u64),
        (config.data_pause_min_ms, config.data_pause_max_ms),
        (config.slot_noise_min_ms, config.slot_noise_max_ms),
        (config.noise_spacing_min_us, config.noise_spacing_max_us),
    ];
    if pairs.iter().any(|(min, max)| min >= max) {
        return Err(ValidationError::new("sampling_bounds_inverted"));
    }
    Ok(())
}

fn default_hop_min_ms() -> u64 {
    120
}

fn default_hop_max_ms() -> u64 {
    300
}

fn default_slots_min() -> u32 {
    20
}

fn default_slots_max() -> u32 {
    45
}

fn default_interaction_pct() -> u8 {
    2
}

fn default_beacon_pct() -> u8 {
    2
}

fn default_sequence_gap_pct() -> u8 {
    20
}

fn default_gap_step_min() -> u16 {
    2
}

fn default_gap_step_max() -> u16 {
    8
}

fn default_auth_pause_min_ms() -> u64 {
    7
}

fn default_auth_pause_max_ms() -> u64 {
    20
}

fn default_assoc_pause_min_ms() -> u64 {
    22
}

fn default_assoc_pause_max_ms() -> u64 {
    50
}

fn default_data_burst_min() -> u32 {
    3
}

fn default_data_burst_max() -> u32 {
    12
}

fn default_data_pause_min_ms() -> u64 {
    3
}

fn default_data_pause_max_ms() -> u64 {
    10
}

fn default_slot_noise_min_ms() -> u64 {
    1
}

fn default_slot_noise_max_ms() -> u64 {
    5
}

fn default_noise_power_floor() -> i8 {
    68
}

fn default_noise_power_jitter() -> i8 {
    6
}

fn default_noise_spacing_min_us() -> u64 {
    200
}

fn default_noise_spacing_max_us() -> u64 {
    900
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            hop_min_ms: default_hop_min_ms(),
            hop_max_ms: default_hop_max_ms(),
            slots_min: default_slots_min(),
            slots_max: default_slots_max(),
            interaction_pct: default_interaction_pct(),
            beacon_pct: default_beacon_pct(),
            sequence_gap_pct: default_sequence_gap_pct(),
            gap_step_min: default_gap_step_min(),
            gap_step_max: default_gap_step_max(),
            auth_pause_min_ms: default_auth_pause_min_ms(),
            auth_pause_max_ms: default_auth_pause_max_ms(),
            assoc_pause_min_ms: default_assoc_pause_min_ms(),
            assoc_pause_max_ms: default_assoc_pause_max_ms(),
            data_burst_min: default_data_burst_min(),
            data_burst_max: default_data_burst_max(),
            data_pause_min_ms: default_data_pause_min_ms(),
            data_pause_max_ms: default_data_pause_max_ms(),
            slot_noise_min_ms: default_slot_noise_min_ms(),
            slot_noise_max_ms: default_slot_noise_max_ms(),
            noise_power_floor: default_noise_power_floor(),
            noise_power_jitter: default_noise_power_jitter(),
            noise_spacing_min_us: default_noise_spacing_min_us(),
            noise_spacing_max_us: default_noise_spacing_max_us(),
        }
    }
}
