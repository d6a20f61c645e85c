//! ## irrbloss-radio::sim
//! **Recording radio for simulation and tests**

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use irrbloss_core::band::{Band, RadioCapabilities};

use crate::error::RadioError;
use crate::Radio;

/// One transmitted frame with the radio state it went out under.
#[derive(Clone, Debug)]
pub struct TxRecord {
    pub band: Band,
    pub channel: u8,
    pub power: i8,
    pub frame: Vec<u8>,
}

struct SimState {
    transmitted: Vec<TxRecord>,
    band: Band,
    channel: u8,
    power: i8,
    steady_memory: Option<u64>,
    memory_script: VecDeque<u64>,
    pending_failures: u64,
    failed: u64,
}

/// In-memory radio. All state sits behind one mutex shared with
/// [`SimRadioHandle`] so tests can script it and inspect the transcript.
pub struct SimRadio {
    state: Arc<Mutex<SimState>>,
    capabilities: RadioCapabilities,
}

impl SimRadio {
    pub fn new(capabilities: RadioCapabilities) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                transmitted: Vec::new(),
                band: Band::TwoGhz,
                channel: 1,
                power: 82,
                steady_memory: None,
                memory_script: VecDeque::new(),
                pending_failures: 0,
                failed: 0,
            })),
            capabilities,
        }
    }

    pub fn handle(&self) -> SimRadioHandle {
        SimRadioHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Radio for SimRadio {
    fn set_channel(&mut self, band: Band, channel: u8) -> Result<(), RadioError> {
        if !self.capabilities.supports(band) {
            return Err(RadioError::UnsupportedBand { band });
        }
        let known = match band {
            Band::TwoGhz => self.capabilities.channels_2g.contains(&channel),
            Band::FiveGhz => self.capabilities.channels_5g.contains(&channel),
        };
        if !known {
            return Err(RadioError::InvalidChannel { band, channel });
        }
        let mut state = self.state.lock();
        state.band = band;
        state.channel = channel;
        Ok(())
    }

    fn set_max_tx_power(&mut self, level: i8) -> Result<(), RadioError> {
        self.state.lock().power = level;
        Ok(())
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        let mut state = self.state.lock();
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            state.failed += 1;
            return Err(RadioError::Io("scripted transmit failure".to_string()));
        }
        let record = TxRecord {
            band: state.band,
            channel: state.channel,
            power: state.power,
            frame: frame.to_vec(),
        };
        state.transmitted.push(record);
        Ok(())
    }

    fn free_memory_estimate(&self) -> Option<u64> {
        let mut state = self.state.lock();
        if let Some(next) = state.memory_script.pop_front() {
            return Some(next);
        }
        state.steady_memory
    }
}

/// Cheap clone of the shared state, for scripting and assertions.
#[derive(Clone)]
pub struct SimRadioHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimRadioHandle {
    pub fn tx_count(&self) -> usize {
        self.state.lock().transmitted.len()
    }

    pub fn failed_count(&self) -> u64 {
        self.state.lock().failed
    }

    pub fn transmitted(&self) -> Vec<TxRecord> {
        self.state.lock().transmitted.clone()
    }

    pub fn drain_transmitted(&self) -> Vec<TxRecord> {
        std::mem::take(&mut self.state.lock().transmitted)
    }

    pub fn current_tuning(&self) -> (Band, u8, i8) {
        let state = self.state.lock();
        (state.band, state.channel, state.power)
    }

    /// Steady free-memory value returned once any scripted values run out.
    pub fn set_free_memory(&self, bytes: Option<u64>) {
        self.state.lock().steady_memory = bytes;
    }

    /// Values returned by successive estimates, ahead of the steady value.
    pub fn script_memory<I: IntoIterator<Item = u64>>(&self, values: I) {
        self.state.lock().memory_script.extend(values);
    }

    /// The next `count` transmit calls fail.
    pub fn fail_next_transmits(&self, count: u64) {
        self.state.lock().pending_failures = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrbloss_core::band::{DEFAULT_CHANNELS_2G, DEFAULT_CHANNELS_5G};

    fn dual_band() -> SimRadio {
        SimRadio::new(RadioCapabilities::dual_band(
            DEFAULT_CHANNELS_2G.to_vec(),
            DEFAULT_CHANNELS_5G.to_vec(),
        ))
    }

    #[test]
    fn records_transmits_with_current_tuning() {
        let mut radio = dual_band();
        let handle = radio.handle();
        radio.set_channel(Band::FiveGhz, 149).unwrap();
        radio.set_max_tx_power(76).unwrap();
        radio.transmit(&[0x40, 0x00]).unwrap();

        let transcript = handle.transmitted();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].band, Band::FiveGhz);
        assert_eq!(transcript[0].channel, 149);
        assert_eq!(transcript[0].power, 76);
        assert_eq!(transcript[0].frame, vec![0x40, 0x00]);
    }

    #[test]
    fn rejects_unknown_bands_and_channels() {
        let mut radio = SimRadio::new(RadioCapabilities::single_band(DEFAULT_CHANNELS_2G.to_vec()));
        assert!(matches!(
            radio.set_channel(Band::FiveGhz, 36),
            Err(RadioError::UnsupportedBand { .. })
        ));
        assert!(matches!(
            radio.set_channel(Band::TwoGhz, 14),
            Err(RadioError::InvalidChannel { .. })
        ));
    }

    #[test]
    fn scripted_failures_then_recovery() {
        let mut radio = dual_band();
        let handle = radio.handle();
        handle.fail_next_transmits(2);
        assert!(radio.transmit(&[1]).is_err());
        assert!(radio.transmit(&[2]).is_err());
        assert!(radio.transmit(&[3]).is_ok());
        assert_eq!(handle.failed_count(), 2);
        assert_eq!(handle.tx_count(), 1);
    }

    #[test]
    fn memory_script_runs_before_the_steady_value() {
        let radio = dual_band();
        let handle = radio.handle();
        handle.set_free_memory(Some(30_000));
        handle.script_memory([24_000, 14_000]);
        assert_eq!(radio.free_memory_estimate(), Some(24_000));
        assert_eq!(radio.free_memory_estimate(), Some(14_000));
        assert_eq!(radio.free_memory_estimate(), Some(30_000));
    }
}
