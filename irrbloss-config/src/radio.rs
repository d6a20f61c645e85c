//! Radio hardware parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RadioConfig {
    /// Monitor-mode interface to inject and capture on.
    #[serde(default = "default_interface")]
    #[validate(custom(function = validation::validate_interface))]
    pub interface: String,

    /// Whether the hardware can reach 5 GHz. With `false`, `channels_5g`
    /// is ignored and the cycler stays on 2.4 GHz.
    #[serde(default = "default_true")]
    pub dual_band: bool,

    /// 2.4 GHz hop plan, in hop order.
    #[serde(default = "default_channels_2g")]
    #[validate(length(min = 1), custom(function = validation::validate_channel_plan))]
    pub channels_2g: Vec<u8>,

    /// 5 GHz hop plan, in hop order.
    #[serde(default = "default_channels_5g")]
    #[validate(custom(function = validation::validate_channel_plan))]
    pub channels_5g: Vec<u8>,

    /// Channel the third-party mesh talks on.
    #[serde(default = "default_mesh_channel")]
    pub mesh_channel: u8,

    /// Band of the mesh channel, `2g` or `5g`.
    #[serde(default = "default_mesh_band")]
    #[validate(custom(function = validation::validate_band))]
    pub mesh_band: String,

    /// Capture snap length in bytes.
    #[serde(default = "default_capture_snaplen")]
    #[validate(range(min = 64, max = 65535))]
    pub capture_snaplen: usize,
}

fn default_interface() -> String {
    "wlan0mon".into()
}

fn default_true() -> bool {
    true
}

fn default_channels_2g() -> Vec<u8> {
    irrbloss_channels_2g()
}

fn default_channels_5g() -> Vec<u8> {
    irrbloss_channels_5g()
}

// Interleaved plans so consecutive same-band hops are never adjacent
// channels.
fn irrbloss_channels_2g() -> Vec<u8> {
    vec![1, 6, 11, 2, 7, 3, 8, 4, 9, 5, 10]
}

fn irrbloss_channels_5g() -> Vec<u8> {
    vec![36, 149, 40, 153, 44, 157, 48, 161, 165]
}

fn default_mesh_channel() -> u8 {
    6
}

fn default_mesh_band() -> String {
    "2g".into()
}

fn default_capture_snaplen() -> usize {
    1024
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            dual_band: default_true(),
            channels_2g: default_channels_2g(),
            channels_5g: default_channels_5g(),
            mesh_channel: default_mesh_channel(),
            mesh_band: default_mesh_band(),
            capture_snaplen: default_capture_snaplen(),
        }
    }
}
