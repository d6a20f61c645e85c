//! ## irrbloss-engine::dwell
//! **One channel dwell: the per-slot transmit burst**
//!
//! A dwell is a run of 20..45 slots on the current channel. Each slot
//! impersonates one random active device: usually a probe request, rarely a
//! short association ritual, occasionally a synthetic AP beacon on top. On
//! the mesh channel a slot may instead replay a cached third-party frame.
//! Every pause inside a slot is filled with anonymous noise probes so the
//! air never goes quiet in a way that frames the real crowd.
//!
//! Transmit and tune failures are counted and debug-logged, never fatal.
//! Frame totals count only frames that actually left the radio; the noise
//! filler counts into the total and the noise counter but not the per-band
//! counters.

use std::time::Duration;

use blake3::Hasher;
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::debug;

use irrbloss_config::{FeatureConfig, TrafficConfig};
use irrbloss_core::band::Band;
use irrbloss_core::device::{DeviceGeneration, SequenceCounter, VirtualDevice};
use irrbloss_core::mac::MacAddr;
use irrbloss_core::time::Clock;
use irrbloss_frames::{data, mgmt};
use irrbloss_radio::Radio;
use irrbloss_relay::RelayCache;
use irrbloss_swarm::{DevicePool, SsidCorpus};
use irrbloss_telemetry::metrics::MetricsRecorder;

use crate::error::EngineError;

/// Borrowed slice of the scheduler's state for the duration of one dwell.
pub(crate) struct DwellRun<'a> {
    pub radio: &'a mut dyn Radio,
    pub pool: &'a mut DevicePool,
    pub corpus: &'a SsidCorpus,
    pub relay: &'a RelayCache,
    pub clock: &'a Clock,
    pub rng: &'a mut SmallRng,
    pub traffic: &'a TrafficConfig,
    pub features: &'a FeatureConfig,
    pub metrics: &'a MetricsRecorder,
    pub hasher: Option<&'a mut Hasher>,
    /// True when this dwell sits on the designated mesh channel.
    pub on_mesh_channel: bool,
    pub rebroadcast_pct: u8,
    pub max_power: i8,
}

impl<'a> DwellRun<'a> {
    pub fn run(&mut self, band: Band, channel: u8) {
        let slots = self
            .rng
            .random_range(self.traffic.slots_min..self.traffic.slots_max);
        for _ in 0..slots {
            // An encoding failure means our own element tables produced an
            // oversized frame; the slot is skipped, the dwell carries on.
            if let Err(e) = self.slot(band, channel) {
                debug!(error = %e, "slot skipped after frame encoding failure");
            }
        }
    }

    fn slot(&mut self, band: Band, channel: u8) -> Result<(), EngineError> {
        if self.features.mesh_relay
            && self.on_mesh_channel
            && self.relay.message_count() > 0
            && self.rng.random_range(0..100) < self.rebroadcast_pct
        {
            self.rebroadcast();
        } else if self.pool.active_len() > 0 {
            let index = self.rng.random_range(0..self.pool.active_len());
            let mut device = self.pool.active()[index].clone();

            self.apply_power(device.tx_power);
            if band == Band::FiveGhz && device.generation == DeviceGeneration::Legacy {
                // A b/g-era device cannot appear on 5 GHz. The whole slot
                // stays silent, beacon and noise included.
                return Ok(());
            }

            let preferred = device
                .preferred_ssid
                .and_then(|index| self.corpus.get(index))
                .map(str::to_string);
            let interact = self.features.interaction_sim
                && self.rng.random_range(0..100) < self.traffic.interaction_pct
                && preferred.is_some();

            match preferred {
                Some(target) if interact => self.interaction(&mut device, &target, band)?,
                _ => self.probe(&mut device, band, channel)?,
            }
            self.pool.active_mut()[index] = device;
        }

        if self.features.beacon_emulation
            && self.rng.random_range(0..100) < self.traffic.beacon_pct
            && !self.corpus.is_empty()
        {
            self.beacon(band, channel)?;
        }

        let noise_ms = self
            .rng
            .random_range(self.traffic.slot_noise_min_ms..self.traffic.slot_noise_max_ms);
        self.fill_silence(Duration::from_millis(noise_ms), band)?;
        Ok(())
    }

    /// One directed or wildcard probe request, then a sequence advance that
    /// occasionally jumps as if frames went out on other channels.
    fn probe(
        &mut self,
        device: &mut VirtualDevice,
        band: Band,
        channel: u8,
    ) -> Result<(), EngineError> {
        let ssid = self.corpus.choose_probe_ssid(device, self.rng);
        let frame = mgmt::probe_request(device, &ssid, band, channel)?;
        if self.transmit(&frame) {
            self.count_frame(band);
        }
        let step = if self.features.sequence_gaps
            && self.rng.random_range(0..100) < self.traffic.sequence_gap_pct
        {
            self.rng
                .random_range(self.traffic.gap_step_min..self.traffic.gap_step_max)
        } else {
            1
        };
        device.sequence.advance(step);
        Ok(())
    }

    /// Auth, association request, then a short encrypted-data burst toward
    /// the device's target BSSID. Auth and assoc are transmitted but kept
    /// out of the frame totals; only the data frames count, per band.
    fn interaction(
        &mut self,
        device: &mut VirtualDevice,
        ssid: &str,
        band: Band,
    ) -> Result<(), EngineError> {
        device.has_connected = true;

        let auth = mgmt::authentication(device)?;
        self.transmit(&auth);
        device.sequence.advance(1);
        let pause = self
            .rng
            .random_range(self.traffic.auth_pause_min_ms..self.traffic.auth_pause_max_ms);
        self.fill_silence(Duration::from_millis(pause), band)?;

        let assoc = mgmt::association_request(device, ssid, band)?;
        self.transmit(&assoc);
        device.sequence.advance(1);
        let pause = self
            .rng
            .random_range(self.traffic.assoc_pause_min_ms..self.traffic.assoc_pause_max_ms);
        self.fill_silence(Duration::from_millis(pause), band)?;

        let burst = self
            .rng
            .random_range(self.traffic.data_burst_min..self.traffic.data_burst_max);
        for _ in 0..burst {
            let frame = data::encrypted_data(device, self.rng)?;
            if self.transmit(&frame) {
                self.count_frame(band);
            }
            device.sequence.advance(1);
            let pause = self
                .rng
                .random_range(self.traffic.data_pause_min_ms..self.traffic.data_pause_max_ms);
            self.fill_silence(Duration::from_millis(pause), band)?;
        }
        self.metrics.interactions_total.inc();
        Ok(())
    }

    /// Beacon from a throwaway synthetic AP advertising a corpus name.
    fn beacon(&mut self, band: Band, channel: u8) -> Result<(), EngineError> {
        let ssid = match self.corpus.random_name(self.rng) {
            Some(name) => name.to_string(),
            None => return Ok(()),
        };
        let mut octets = [0u8; 6];
        octets[0] = 0x02;
        octets[1] = 0x11;
        octets[2] = 0x22;
        self.rng.fill(&mut octets[3..]);
        let ap_mac = MacAddr::new(octets);

        self.apply_power(self.max_power);
        let seq = self.rng.random_range(0..SequenceCounter::MODULUS);
        let frame = mgmt::beacon(ap_mac, &ssid, band, channel, seq)?;
        if self.transmit(&frame) {
            self.count_frame(band);
            self.metrics.beacons_total.inc();
        }
        Ok(())
    }

    /// Replays one cached third-party mesh frame verbatim at full power.
    fn rebroadcast(&mut self) {
        if let Some(payload) = self.relay.pick_random(self.rng) {
            self.apply_power(self.max_power);
            if self.transmit(&payload) {
                self.metrics.relays_total.inc();
            }
        }
    }

    /// Transmits anonymous noise probes until the deadline. Power drops to
    /// the noise floor and stays there; the next slot re-applies a device
    /// power level anyway.
    fn fill_silence(&mut self, duration: Duration, band: Band) -> Result<(), EngineError> {
        let jitter = if self.traffic.noise_power_jitter > 0 {
            self.rng.random_range(0..self.traffic.noise_power_jitter)
        } else {
            0
        };
        self.apply_power(self.traffic.noise_power_floor + jitter);

        let deadline = self.clock.now_ns() + duration.as_nanos() as u64;
        while self.clock.now_ns() < deadline {
            let frame = mgmt::noise_probe(self.rng, band)?;
            if self.transmit(&frame) {
                self.metrics.frames_total.inc();
                self.metrics.noise_frames_total.inc();
            }
            let spacing = self
                .rng
                .random_range(self.traffic.noise_spacing_min_us..self.traffic.noise_spacing_max_us);
            self.clock.sleep(Duration::from_micros(spacing));
        }
        Ok(())
    }

    /// Hands one frame to the radio. Failures count, never abort. The state
    /// hasher sees every frame in transmit order, failed or not.
    fn transmit(&mut self, frame: &[u8]) -> bool {
        if let Some(hasher) = self.hasher.as_deref_mut() {
            hasher.update(frame);
        }
        match self.radio.transmit(frame) {
            Ok(()) => true,
            Err(e) => {
                self.metrics.tx_failures_total.inc();
                debug!(error = %e, "transmit failed");
                false
            }
        }
    }

    fn apply_power(&mut self, level: i8) {
        if let Err(e) = self.radio.set_max_tx_power(level) {
            self.metrics.tx_failures_total.inc();
            debug!(level, error = %e, "power adjust failed");
        }
    }

    fn count_frame(&mut self, band: Band) {
        self.metrics.frames_total.inc();
        match band {
            Band::TwoGhz => self.metrics.frames_2g_total.inc(),
            Band::FiveGhz => self.metrics.frames_5g_total.inc(),
        }
    }
}
