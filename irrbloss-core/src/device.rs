//! ## irrbloss-core::device
//! **Virtual device identity and per-device 802.11 sequence state**

use std::fmt;

use crate::mac::MacAddr;

/// Hardware era a virtual device emulates. Controls which capability
/// elements its frames may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceGeneration {
    /// 802.11b/g era: short rate set, no VHT/HE, never a private address.
    Legacy,
    /// 802.11n/ac era without HE.
    Common,
    /// 802.11ax era: always advertises HE.
    Modern,
}

impl fmt::Display for DeviceGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceGeneration::Legacy => write!(f, "legacy"),
            DeviceGeneration::Common => write!(f, "common"),
            DeviceGeneration::Modern => write!(f, "modern"),
        }
    }
}

/// Vendor software stack, used for platform-specific element flavoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Android,
    Other,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
            Platform::Other => write!(f, "other"),
        }
    }
}

/// 12-bit 802.11 sequence counter. Strictly monotonic modulo 4096; a step
/// below 1 is clamped to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    pub const MODULUS: u16 = 4096;

    pub fn new(start: u16) -> Self {
        SequenceCounter(start % Self::MODULUS)
    }

    pub fn current(&self) -> u16 {
        self.0
    }

    pub fn advance(&mut self, step: u16) {
        self.0 = ((u32::from(self.0) + u32::from(step.max(1))) % u32::from(Self::MODULUS)) as u16;
    }
}

/// One synthetic station. Owned by exactly one pool at a time; moves between
/// pools by value.
#[derive(Clone, Debug)]
pub struct VirtualDevice {
    pub mac: MacAddr,
    /// AP the device pretends to associate with.
    pub bssid_target: MacAddr,
    pub sequence: SequenceCounter,
    pub generation: DeviceGeneration,
    pub platform: Platform,
    /// Index into the SSID corpus, when the device probes for a known name.
    pub preferred_ssid: Option<usize>,
    /// Transmit power level in quarter-dBm units.
    pub tx_power: i8,
    pub has_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_wraps_mod_4096() {
        let mut seq = SequenceCounter::new(4094);
        seq.advance(1);
        assert_eq!(seq.current(), 4095);
        seq.advance(1);
        assert_eq!(seq.current(), 0);
        seq.advance(7);
        assert_eq!(seq.current(), 7);
    }

    #[test]
    fn zero_step_still_advances() {
        let mut seq = SequenceCounter::new(10);
        seq.advance(0);
        assert_eq!(seq.current(), 11);
    }

    #[test]
    fn initial_value_is_reduced() {
        assert_eq!(SequenceCounter::new(5000).current(), 5000 % 4096);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn advances_by_step_mod_4096(start: u16, step: u16) {
                let mut seq = SequenceCounter::new(start);
                let before = u32::from(seq.current());
                seq.advance(step);

                prop_assert!(seq.current() < SequenceCounter::MODULUS);
                let expected = (before + u32::from(step.max(1))) % 4096;
                prop_assert_eq!(u32::from(seq.current()), expected);
            }
        }
    }
}
