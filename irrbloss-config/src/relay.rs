//! Mesh relay parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate, ValidationError};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validate_relay))]
pub struct RelayConfig {
    /// Vendor OUI identifying mesh action frames, six hex digits.
    #[serde(default = "default_oui")]
    #[validate(custom(function = validation::validate_oui))]
    pub oui: String,

    /// Accepted mesh frame length bounds (bytes).
    #[serde(default = "default_min_frame_len")]
    #[validate(range(min = 28, max = 2048))]
    pub min_frame_len: usize,

    #[serde(default = "default_max_frame_len")]
    #[validate(range(min = 29, max = 2048))]
    pub max_frame_len: usize,

    /// Capture-to-scheduler handoff queue capacities.
    #[serde(default = "default_mesh_queue_capacity")]
    #[validate(range(min = 1, max = 4096))]
    pub mesh_queue_capacity: usize,

    #[serde(default = "default_ssid_queue_capacity")]
    #[validate(range(min = 1, max = 4096))]
    pub ssid_queue_capacity: usize,

    /// Cached message cap.
    #[serde(default = "default_max_messages")]
    #[validate(range(min = 1, max = 1024))]
    pub max_messages: usize,

    /// Sender records expire after this many seconds unseen.
    #[serde(default = "default_sender_window_secs")]
    #[validate(range(min = 1))]
    pub sender_window_secs: u64,

    /// Individual messages expire after this many seconds unrefreshed.
    #[serde(default = "default_message_ttl_secs")]
    #[validate(range(min = 1))]
    pub message_ttl_secs: u64,

    /// Total silence for this long drops the whole cache.
    #[serde(default = "default_decay_timeout_secs")]
    #[validate(range(min = 1))]
    pub decay_timeout_secs: u64,

    /// Listen window length on the mesh channel (milliseconds).
    #[serde(default = "default_listen_window_ms")]
    #[validate(range(min = 10, max = 10000))]
    pub listen_window_ms: u64,

    /// Listen scheduling interval while the mesh is active (seconds).
    #[serde(default = "default_fast_listen_secs")]
    #[validate(range(min = 1))]
    pub fast_listen_secs: u64,

    /// Listen scheduling interval while dormant (seconds).
    #[serde(default = "default_slow_listen_secs")]
    #[validate(range(min = 1))]
    pub slow_listen_secs: u64,

    /// Probability of a rebroadcast slot on the mesh channel.
    #[serde(default = "default_rebroadcast_pct")]
    #[validate(range(max = 100))]
    pub rebroadcast_pct: u8,
}

impl RelayConfig {
    /// OUI bytes from the hex field. Validation guarantees six hex digits.
    pub fn oui_bytes(&self) -> [u8; 3] {
        let mut bytes = [0u8; 3];
        if let Ok(decoded) = hex::decode(&self.oui) {
            bytes.copy_from_slice(&decoded[..3]);
        }
        bytes
    }
}

fn validate_relay(config: &RelayConfig) -> Result<(), ValidationError> {
    if config.min_frame_len >= config.max_frame_len {
        return Err(ValidationError::new("frame_len_bounds_inverted"));
    }
    if config.fast_listen_secs > config.slow_listen_secs {
        return Err(ValidationError::new("listen_intervals_inverted"));
    }
    Ok(())
}

fn default_oui() -> String {
    "18fe34".into()
}

fn default_min_frame_len() -> usize {
    39
}

fn default_max_frame_len() -> usize {
    310
}

fn default_mesh_queue_capacity() -> usize {
    16
}

fn default_ssid_queue_capacity() -> usize {
    20
}

fn default_max_messages() -> usize {
    40
}

fn default_sender_window_secs() -> u64 {
    300
}

fn default_message_ttl_secs() -> u64 {
    600
}

fn default_decay_timeout_secs() -> u64 {
    600
}

fn default_listen_window_ms() -> u64 {
    250
}

fn default_fast_listen_secs() -> u64 {
    3
}

fn default_slow_listen_secs() -> u64 {
    30
}

fn default_rebroadcast_pct() -> u8 {
    5
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            oui: default_oui(),
            min_frame_len: default_min_frame_len(),
            max_frame_len: default_max_frame_len(),
            mesh_queue_capacity: default_mesh_queue_capacity(),
            ssid_queue_capacity: default_ssid_queue_capacity(),
            max_messages: default_max_messages(),
            sender_window_secs: default_sender_window_secs(),
            message_ttl_secs: default_message_ttl_secs(),
            decay_timeout_secs: default_decay_timeout_secs(),
            listen_window_ms: default_listen_window_ms(),
            fast_listen_secs: default_fast_listen_secs(),
            slow_listen_secs: default_slow_listen_secs(),
            rebroadcast_pct: default_rebroadcast_pct(),
        }
    }
}
