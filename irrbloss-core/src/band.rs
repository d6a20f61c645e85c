//! ## irrbloss-core::band
//! **Band/channel model and the radio capability descriptor**
//!
//! Hardware reach is described at runtime by [`RadioCapabilities`]; the
//! scheduler derives its hop strategy from the descriptor instead of
//! compiling for one band.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    TwoGhz,
    FiveGhz,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::TwoGhz => write!(f, "2.4GHz"),
            Band::FiveGhz => write!(f, "5GHz"),
        }
    }
}

/// Default 2.4 GHz rotation: the three non-overlapping channels first, then
/// the in-between ones.
pub const DEFAULT_CHANNELS_2G: [u8; 11] = [1, 6, 11, 2, 7, 3, 8, 4, 9, 5, 10];

/// Default 5 GHz rotation alternating UNII-1 and UNII-3 channels.
pub const DEFAULT_CHANNELS_5G: [u8; 9] = [36, 149, 40, 153, 44, 157, 48, 161, 165];

/// Center frequency in MHz, or `None` for a channel outside the band.
pub fn channel_to_frequency(band: Band, channel: u8) -> Option<u16> {
    match band {
        Band::TwoGhz => match channel {
            1..=13 => Some(2407 + 5 * channel as u16),
            14 => Some(2484),
            _ => None,
        },
        Band::FiveGhz => match channel {
            36..=177 => Some(5000 + 5 * channel as u16),
            _ => None,
        },
    }
}

/// What the attached radio can actually do, captured once at startup.
///
/// An empty 5 GHz plan encodes a single-band radio.
#[derive(Clone, Debug)]
pub struct RadioCapabilities {
    pub channels_2g: Vec<u8>,
    pub channels_5g: Vec<u8>,
}

impl RadioCapabilities {
    pub fn single_band(channels_2g: Vec<u8>) -> Self {
        Self {
            channels_2g,
            channels_5g: Vec::new(),
        }
    }

    pub fn dual_band(channels_2g: Vec<u8>, channels_5g: Vec<u8>) -> Self {
        Self {
            channels_2g,
            channels_5g,
        }
    }

    pub fn is_dual_band(&self) -> bool {
        !self.channels_5g.is_empty()
    }

    pub fn supports(&self, band: Band) -> bool {
        match band {
            Band::TwoGhz => !self.channels_2g.is_empty(),
            Band::FiveGhz => !self.channels_5g.is_empty(),
        }
    }
}

impl Default for RadioCapabilities {
    fn default() -> Self {
        Self::dual_band(DEFAULT_CHANNELS_2G.to_vec(), DEFAULT_CHANNELS_5G.to_vec())
    }
}
