//! ## irrbloss-swarm::identity
//! **Weighted identity generation**
//!
//! Draws a vendor category from a configurable weight table, then maps the
//! category onto a hardware era and platform. The mapping is strict: the
//! legacy-IoT category is the only source of `Legacy` devices and never
//! carries an iOS platform, so the synthesized population can't contain
//! combinations no real fleet would show.

use rand::Rng;

use irrbloss_core::device::{DeviceGeneration, Platform, SequenceCounter, VirtualDevice};
use irrbloss_core::mac::MacAddr;

use crate::corpus::SsidCorpus;

pub const OUI_APPLE: [[u8; 3]; 15] = [
    [0xFC, 0xFC, 0x48],
    [0xBC, 0xD0, 0x74],
    [0xAC, 0x1F, 0x0F],
    [0xF0, 0xD4, 0x15],
    [0xF0, 0x98, 0x9D],
    [0x34, 0x14, 0x5F],
    [0xDC, 0xA9, 0x04],
    [0x28, 0xCF, 0xE9],
    [0xAC, 0xBC, 0x32],
    [0xE4, 0xCE, 0x8F],
    [0xBC, 0x9F, 0xEF],
    [0x48, 0x4B, 0xAA],
    [0x88, 0x66, 0x5A],
    [0x1C, 0x91, 0x48],
    [0x60, 0xFA, 0xCD],
];

pub const OUI_SAMSUNG: [[u8; 3]; 10] = [
    [0x24, 0xFC, 0xE5],
    [0x8C, 0x96, 0xD4],
    [0x5C, 0xCB, 0x99],
    [0x34, 0x21, 0x09],
    [0x84, 0x25, 0xDB],
    [0x00, 0xE0, 0x64],
    [0x80, 0xEA, 0x96],
    [0x38, 0x01, 0x95],
    [0xB0, 0xC0, 0x90],
    [0xFC, 0xC2, 0xDE],
];

pub const OUI_LEGACY_IOT: [[u8; 3]; 7] = [
    [0x00, 0x14, 0x38],
    [0x00, 0x0D, 0x93],
    [0x00, 0x1F, 0x32],
    [0x00, 0x16, 0x35],
    [0x00, 0x04, 0xBD],
    [0x00, 0x17, 0xE0],
    [0x00, 0x1B, 0x7A],
];

pub const OUI_MODERN_GENERIC: [[u8; 3]; 8] = [
    [0x3C, 0x5C, 0x48],
    [0x8C, 0xF5, 0xA3],
    [0x74, 0xC6, 0x3B],
    [0xFC, 0xA6, 0x67],
    [0xE8, 0x6A, 0x64],
    [0x60, 0x55, 0xF9],
    [0xDC, 0x8C, 0x90],
    [0x40, 0x9F, 0x38],
];

/// Prefix of every target BSSID the crowd pretends to associate with.
pub const BSSID_TARGET_PREFIX: [u8; 3] = [0x00, 0x11, 0x32];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityCategory {
    AppleClass,
    SamsungClass,
    LegacyIot,
    ModernGeneric,
}

/// Relative draw weights. Only ratios matter; the roll is cumulative over
/// the sum, so `{45, 25, 15, 15}` is as valid as the default percentages.
#[derive(Clone, Debug)]
pub struct CategoryWeights {
    pub apple: u32,
    pub samsung: u32,
    pub legacy_iot: u32,
    pub modern_generic: u32,
}

impl CategoryWeights {
    pub fn total(&self) -> u32 {
        self.apple + self.samsung + self.legacy_iot + self.modern_generic
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            apple: 40,
            samsung: 35,
            legacy_iot: 7,
            modern_generic: 18,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentityTuning {
    pub weights: CategoryWeights,
    /// Quarter-dBm power levels a fresh device picks from.
    pub power_levels: Vec<i8>,
    pub private_mac_modern_pct: u8,
    pub private_mac_common_pct: u8,
    pub preferred_ssid_legacy_pct: u8,
    pub preferred_ssid_default_pct: u8,
}

impl Default for IdentityTuning {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            power_levels: vec![72, 74, 76, 78, 80, 82],
            private_mac_modern_pct: 85,
            private_mac_common_pct: 50,
            preferred_ssid_legacy_pct: 90,
            preferred_ssid_default_pct: 60,
        }
    }
}

pub fn draw_category<R: Rng>(weights: &CategoryWeights, rng: &mut R) -> IdentityCategory {
    let total = weights.total().max(1);
    let roll = rng.random_range(0..total);
    if roll < weights.apple {
        IdentityCategory::AppleClass
    } else if roll < weights.apple + weights.samsung {
        IdentityCategory::SamsungClass
    } else if roll < weights.apple + weights.samsung + weights.legacy_iot {
        IdentityCategory::LegacyIot
    } else {
        IdentityCategory::ModernGeneric
    }
}

fn pick_oui<R: Rng>(table: &[[u8; 3]], rng: &mut R) -> [u8; 3] {
    table[rng.random_range(0..table.len())]
}

/// Rolls one virtual device: category, era, platform, addressing, power and
/// probe preference.
pub fn generate_identity<R: Rng>(
    tuning: &IdentityTuning,
    corpus: &SsidCorpus,
    rng: &mut R,
) -> VirtualDevice {
    let category = draw_category(&tuning.weights, rng);
    let (oui, generation, platform) = match category {
        IdentityCategory::AppleClass => {
            let generation = if rng.random_range(0..100) < 80 {
                DeviceGeneration::Common
            } else {
                DeviceGeneration::Modern
            };
            (pick_oui(&OUI_APPLE, rng), generation, Platform::Ios)
        }
        IdentityCategory::SamsungClass => {
            let generation = if rng.random_range(0..100) < 70 {
                DeviceGeneration::Common
            } else {
                DeviceGeneration::Modern
            };
            (pick_oui(&OUI_SAMSUNG, rng), generation, Platform::Android)
        }
        IdentityCategory::LegacyIot => (
            pick_oui(&OUI_LEGACY_IOT, rng),
            DeviceGeneration::Legacy,
            Platform::Other,
        ),
        IdentityCategory::ModernGeneric => (
            pick_oui(&OUI_MODERN_GENERIC, rng),
            DeviceGeneration::Modern,
            Platform::Android,
        ),
    };

    let use_private = match generation {
        DeviceGeneration::Modern => rng.random_range(0..100) < tuning.private_mac_modern_pct,
        DeviceGeneration::Common => rng.random_range(0..100) < tuning.private_mac_common_pct,
        DeviceGeneration::Legacy => false,
    };
    let mac = if use_private {
        MacAddr::random_private(rng)
    } else {
        MacAddr::from_oui(oui, rng)
    };

    let bssid_target = MacAddr::from_oui(BSSID_TARGET_PREFIX, rng);

    let probe_pct = if generation == DeviceGeneration::Legacy {
        tuning.preferred_ssid_legacy_pct
    } else {
        tuning.preferred_ssid_default_pct
    };
    let preferred_ssid = if !corpus.is_empty() && rng.random_range(0..100) < probe_pct {
        Some(rng.random_range(0..corpus.len()))
    } else {
        None
    };

    let tx_power = tuning.power_levels[rng.random_range(0..tuning.power_levels.len())];

    VirtualDevice {
        mac,
        bssid_target,
        sequence: SequenceCounter::new(rng.random_range(0..4096)),
        generation,
        platform,
        preferred_ssid,
        tx_power,
        has_connected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn seeded_corpus() -> SsidCorpus {
        SsidCorpus::with_seeds(100, Duration::from_secs(30))
    }

    #[test]
    fn weighted_draw_tracks_the_table() {
        let weights = CategoryWeights {
            apple: 45,
            samsung: 25,
            legacy_iot: 15,
            modern_generic: 15,
        };
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
        let mut counts = [0u32; 4];
        for _ in 0..1000 {
            match draw_category(&weights, &mut rng) {
                IdentityCategory::AppleClass => counts[0] += 1,
                IdentityCategory::SamsungClass => counts[1] += 1,
                IdentityCategory::LegacyIot => counts[2] += 1,
                IdentityCategory::ModernGeneric => counts[3] += 1,
            }
        }
        // Each within five points of the expectation per thousand draws.
        let expected = [450i32, 250, 150, 150];
        for (count, want) in counts.iter().zip(expected) {
            assert!(
                (*count as i32 - want).abs() <= 50,
                "count {} too far from {}",
                count,
                want
            );
        }
    }

    #[test]
    fn era_mapping_never_produces_legacy_ios() {
        let tuning = IdentityTuning::default();
        let corpus = seeded_corpus();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let device = generate_identity(&tuning, &corpus, &mut rng);
            if device.platform == Platform::Ios {
                assert_ne!(device.generation, DeviceGeneration::Legacy);
            }
            if device.generation == DeviceGeneration::Legacy {
                assert_eq!(device.platform, Platform::Other);
            }
        }
    }

    #[test]
    fn legacy_devices_never_use_private_addresses() {
        let tuning = IdentityTuning {
            weights: CategoryWeights {
                apple: 0,
                samsung: 0,
                legacy_iot: 1,
                modern_generic: 0,
            },
            ..IdentityTuning::default()
        };
        let corpus = seeded_corpus();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let device = generate_identity(&tuning, &corpus, &mut rng);
            assert_eq!(device.generation, DeviceGeneration::Legacy);
            assert!(!device.mac.is_locally_administered());
            assert!(OUI_LEGACY_IOT.contains(&[
                device.mac.octets()[0],
                device.mac.octets()[1],
                device.mac.octets()[2]
            ]));
        }
    }

    #[test]
    fn modern_devices_mostly_randomize() {
        let tuning = IdentityTuning {
            weights: CategoryWeights {
                apple: 0,
                samsung: 0,
                legacy_iot: 0,
                modern_generic: 1,
            },
            ..IdentityTuning::default()
        };
        let corpus = seeded_corpus();
        let mut rng = SmallRng::seed_from_u64(11);
        let private = (0..500)
            .filter(|_| {
                generate_identity(&tuning, &corpus, &mut rng)
                    .mac
                    .is_locally_administered()
            })
            .count();
        // 85% nominal; allow wide slack for the sample size.
        assert!((350..=480).contains(&private), "private count {}", private);
    }

    #[test]
    fn identity_fields_are_well_formed() {
        let tuning = IdentityTuning::default();
        let corpus = seeded_corpus();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let device = generate_identity(&tuning, &corpus, &mut rng);
            assert_eq!(&device.bssid_target.octets()[..3], &BSSID_TARGET_PREFIX);
            assert!(tuning.power_levels.contains(&device.tx_power));
            assert!(device.sequence.current() < 4096);
            if let Some(idx) = device.preferred_ssid {
                assert!(idx < corpus.len());
            }
            assert!(!device.has_connected);
        }
    }

    #[test]
    fn empty_corpus_means_no_preference() {
        let tuning = IdentityTuning::default();
        let corpus = SsidCorpus::empty(100, Duration::from_secs(30));
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(generate_identity(&tuning, &corpus, &mut rng)
                .preferred_ssid
                .is_none());
        }
    }
}
