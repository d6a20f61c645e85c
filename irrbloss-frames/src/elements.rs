//! ## irrbloss-frames::elements
//! **Element IDs and the fixed capability/vendor payloads**
//!
//! Payload bytes are sanitized captures of real chipset advertisements; they
//! stay constant across the fleet so per-device variance comes from element
//! presence and ordering, not from capability bits no real driver would
//! toggle.

use irrbloss_core::band::Band;
use irrbloss_core::device::DeviceGeneration;

pub const ELEM_SSID: u8 = 0;
pub const ELEM_SUPPORTED_RATES: u8 = 1;
pub const ELEM_DS_PARAMETER: u8 = 3;
pub const ELEM_HT_CAPABILITIES: u8 = 45;
pub const ELEM_RSN: u8 = 48;
pub const ELEM_HT_OPERATION: u8 = 61;
pub const ELEM_EXTENDED_CAPABILITIES: u8 = 127;
pub const ELEM_VHT_CAPABILITIES: u8 = 191;
pub const ELEM_VHT_OPERATION: u8 = 192;
pub const ELEM_VENDOR_SPECIFIC: u8 = 221;
pub const ELEM_EXTENSION: u8 = 255;

/// Extension ID under element 255.
pub const EXT_HE_CAPABILITIES: u8 = 35;

pub const HT_CAPS: [u8; 25] = [
    0xEF, 0x01, 0x1B, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub const VHT_CAPS: [u8; 12] = [
    0x91, 0x59, 0x82, 0x0F, 0xEA, 0xFF, 0x00, 0x00, 0xEA, 0xFF, 0x00, 0x00,
];

pub const HE_CAPS: [u8; 22] = [
    0x23, 0x09, 0x01, 0x00, 0x02, 0x40, 0x00, 0x04, 0x70, 0x0C, 0x89, 0x7F, 0x03, 0x80, 0x04,
    0x00, 0x00, 0x00, 0xAA, 0xAA, 0xAA, 0xAA,
];

/// WPA2-PSK (AES-CCMP pairwise and group) RSN body.
pub const RSN_WPA2_PSK: [u8; 20] = [
    0x01, 0x00, 0x00, 0x0F, 0xAC, 0x04, 0x01, 0x00, 0x00, 0x0F, 0xAC, 0x04, 0x01, 0x00, 0x00,
    0x0F, 0xAC, 0x02, 0x00, 0x00,
];

pub const APPLE_VENDOR: [u8; 7] = [0x00, 0x17, 0xF2, 0x0A, 0x00, 0x01, 0x04];

pub const WFA_VENDOR: [u8; 9] = [0x00, 0x10, 0x18, 0x02, 0x00, 0x00, 0x1C, 0x00, 0x00];

pub const EXT_CAPS_APPLE: [u8; 8] = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x40];

pub const EXT_CAPS_ANDROID: [u8; 8] = [0x04, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x40];

/// 1/2/5.5/11 Mbit with the basic-rate bit set.
pub const RATES_LEGACY: [u8; 4] = [0x82, 0x84, 0x8B, 0x96];

pub const RATES_MODERN_2G: [u8; 8] = [0x02, 0x04, 0x0B, 0x16, 0x0C, 0x12, 0x18, 0x24];

/// OFDM-only set used on 5 GHz regardless of generation.
pub const RATES_5G: [u8; 8] = [0x0C, 0x12, 0x18, 0x24, 0x30, 0x48, 0x60, 0x6C];

/// Era- and band-conditioned supported-rates payload.
pub fn rates_for(band: Band, generation: DeviceGeneration) -> &'static [u8] {
    match band {
        Band::FiveGhz => &RATES_5G,
        Band::TwoGhz => {
            if generation == DeviceGeneration::Legacy {
                &RATES_LEGACY
            } else {
                &RATES_MODERN_2G
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_rates_only_on_24ghz() {
        assert_eq!(
            rates_for(Band::TwoGhz, DeviceGeneration::Legacy),
            &RATES_LEGACY
        );
        assert_eq!(
            rates_for(Band::TwoGhz, DeviceGeneration::Modern),
            &RATES_MODERN_2G
        );
        for generation in [
            DeviceGeneration::Legacy,
            DeviceGeneration::Common,
            DeviceGeneration::Modern,
        ] {
            assert_eq!(rates_for(Band::FiveGhz, generation), &RATES_5G);
        }
    }
}
