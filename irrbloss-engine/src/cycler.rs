//! ## irrbloss-engine::cycler
//! **Band alternation and channel rotation**
//!
//! The hop order is derived from the radio capability descriptor at
//! startup. A dual-band radio alternates strictly between 2.4 GHz and
//! 5 GHz with an independent cursor per band, so each plan is walked in
//! order no matter how the bands interleave. A single-band radio walks
//! the 2.4 GHz plan linearly.

use irrbloss_config::RadioConfig;
use irrbloss_core::band::{Band, RadioCapabilities, DEFAULT_CHANNELS_2G};

/// Builds the capability descriptor the radio backend and the cycler
/// share, from the validated radio section of the config.
pub fn capabilities_from(radio: &RadioConfig) -> RadioCapabilities {
    if radio.dual_band {
        RadioCapabilities::dual_band(radio.channels_2g.clone(), radio.channels_5g.clone())
    } else {
        RadioCapabilities::single_band(radio.channels_2g.clone())
    }
}

pub struct BandCycler {
    channels_2g: Vec<u8>,
    channels_5g: Vec<u8>,
    cursor_2g: usize,
    cursor_5g: usize,
    next_is_5g: bool,
}

impl BandCycler {
    /// An empty 2.4 GHz plan falls back to the default rotation; every
    /// radio this runs on can at least do 2.4 GHz.
    pub fn new(capabilities: &RadioCapabilities) -> Self {
        let channels_2g = if capabilities.channels_2g.is_empty() {
            DEFAULT_CHANNELS_2G.to_vec()
        } else {
            capabilities.channels_2g.clone()
        };
        Self {
            channels_2g,
            channels_5g: capabilities.channels_5g.clone(),
            cursor_2g: 0,
            cursor_5g: 0,
            next_is_5g: false,
        }
    }

    pub fn is_dual_band(&self) -> bool {
        !self.channels_5g.is_empty()
    }

    /// Next band and channel. The first hop is always 2.4 GHz.
    pub fn next_hop(&mut self) -> (Band, u8) {
        if self.next_is_5g && self.is_dual_band() {
            let channel = self.channels_5g[self.cursor_5g];
            self.cursor_5g = (self.cursor_5g + 1) % self.channels_5g.len();
            self.next_is_5g = false;
            (Band::FiveGhz, channel)
        } else {
            let channel = self.channels_2g[self.cursor_2g];
            self.cursor_2g = (self.cursor_2g + 1) % self.channels_2g.len();
            self.next_is_5g = true;
            (Band::TwoGhz, channel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_band_hops_alternate() {
        let caps = RadioCapabilities::dual_band(vec![1, 6, 11], vec![36, 149]);
        let mut cycler = BandCycler::new(&caps);
        let hops: Vec<(Band, u8)> = (0..6).map(|_| cycler.next_hop()).collect();
        assert_eq!(
            hops,
            vec![
                (Band::TwoGhz, 1),
                (Band::FiveGhz, 36),
                (Band::TwoGhz, 6),
                (Band::FiveGhz, 149),
                (Band::TwoGhz, 11),
                (Band::FiveGhz, 36),
            ]
        );
        for pair in hops.windows(2) {
            assert_ne!(pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn cursors_advance_independently() {
        let caps = RadioCapabilities::dual_band(vec![1, 6], vec![36, 40, 44]);
        let mut cycler = BandCycler::new(&caps);
        let channels_5g: Vec<u8> = (0..12)
            .map(|_| cycler.next_hop())
            .filter(|(band, _)| *band == Band::FiveGhz)
            .map(|(_, ch)| ch)
            .collect();
        assert_eq!(channels_5g, vec![36, 40, 44, 36, 40, 44]);
    }

    #[test]
    fn single_band_walks_the_plan_in_order() {
        let caps = RadioCapabilities::single_band(vec![1, 6, 11]);
        let mut cycler = BandCycler::new(&caps);
        assert!(!cycler.is_dual_band());
        let hops: Vec<(Band, u8)> = (0..7).map(|_| cycler.next_hop()).collect();
        for (band, _) in &hops {
            assert_eq!(*band, Band::TwoGhz);
        }
        let channels: Vec<u8> = hops.iter().map(|(_, ch)| *ch).collect();
        assert_eq!(channels, vec![1, 6, 11, 1, 6, 11, 1]);
    }
}
