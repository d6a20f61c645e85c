//! Feature switches.
//!
//! Each switch turns one behavior off wholesale; everything defaults on.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FeatureConfig {
    /// Learn SSIDs from observed probe requests.
    #[serde(default = "default_true")]
    pub passive_ssid_learning: bool,

    /// Feed learned SSIDs back into the probe corpus.
    #[serde(default = "default_true")]
    pub ssid_replication: bool,

    /// Rotate devices through the active/dormant pools.
    #[serde(default = "default_true")]
    pub lifecycle_churn: bool,

    /// Occasionally skip sequence numbers to mimic missed frames.
    #[serde(default = "default_true")]
    pub sequence_gaps: bool,

    /// Emit ambient beacons for synthetic access points.
    #[serde(default = "default_true")]
    pub beacon_emulation: bool,

    /// Run the auth/assoc/data interaction sequence.
    #[serde(default = "default_true")]
    pub interaction_sim: bool,

    /// Listen for and rebroadcast third-party mesh frames.
    #[serde(default = "default_true")]
    pub mesh_relay: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            passive_ssid_learning: default_true(),
            ssid_replication: default_true(),
            lifecycle_churn: default_true(),
            sequence_gaps: default_true(),
            beacon_emulation: default_true(),
            interaction_sim: default_true(),
            mesh_relay: default_true(),
        }
    }
}
