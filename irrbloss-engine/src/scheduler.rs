//! ## irrbloss-engine::scheduler
//! **The single-consumer duty loop**
//!
//! One `Scheduler` owns every mutable piece of the system: the device
//! pools, the SSID corpus, the relay cache, the radio handle, the rng and
//! the clock. The capture side only ever reaches it through the bounded
//! handoff queues, so no lock is shared with the receive path. `tick()`
//! runs the duties in a fixed order against nanosecond deadlines: drain
//! learned SSIDs, apply memory pressure, churn the swarm, hop and dwell,
//! open a mesh listen window, publish a status snapshot. In-flight work is
//! never cancelled; termination is checked between ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use blake3::Hasher;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info, instrument};

use irrbloss_config::{IrrblossConfig, RelayConfig};
use irrbloss_core::band::Band;
use irrbloss_core::mac::MacAddr;
use irrbloss_core::queue::HandoffQueue;
use irrbloss_core::time::Clock;
use irrbloss_radio::Radio;
use irrbloss_relay::{CaptureTap, MeshFilter, RelayCache, RelayTuning};
use irrbloss_swarm::{
    CategoryWeights, DevicePool, IdentityTuning, MemoryPolicy, PoolTuning, PressureLevel,
    SsidCorpus,
};
use irrbloss_telemetry::metrics::MetricsRecorder;
use irrbloss_telemetry::snapshot::{StatusSink, StatusSnapshot};

use crate::cycler::{capabilities_from, BandCycler};
use crate::dwell::DwellRun;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
/// Pacing sleep between duty passes.
const PACING_TICK: Duration = Duration::from_millis(1);
/// Memory pressure is sampled on a fixed cadence rather than every pass.
const PRESSURE_INTERVAL: Duration = Duration::from_secs(1);

/// Consumer ends of the capture handoff. The matching producer side lives
/// inside the [`CaptureTap`] handed to the capture loop.
#[derive(Clone)]
pub struct CaptureChannels {
    pub mesh: HandoffQueue<Bytes>,
    pub ssid: HandoffQueue<String>,
}

impl CaptureChannels {
    pub fn from_config(relay: &RelayConfig) -> Self {
        Self {
            mesh: HandoffQueue::with_capacity(relay.mesh_queue_capacity),
            ssid: HandoffQueue::with_capacity(relay.ssid_queue_capacity),
        }
    }

    /// Capture-side classifier feeding these queues.
    pub fn tap(&self, relay: &RelayConfig) -> CaptureTap {
        let filter = MeshFilter {
            oui: relay.oui_bytes(),
            min_len: relay.min_frame_len,
            max_len: relay.max_frame_len,
        };
        CaptureTap::new(filter, self.mesh.clone(), self.ssid.clone())
    }
}

struct Deadlines {
    hop_ns: u64,
    lifecycle_ns: u64,
    mesh_listen_ns: u64,
    snapshot_ns: u64,
    pressure_ns: u64,
}

pub struct Scheduler {
    config: IrrblossConfig,
    clock: Clock,
    rng: SmallRng,
    radio: Box<dyn Radio>,
    cycler: BandCycler,
    pool: DevicePool,
    corpus: SsidCorpus,
    relay: RelayCache,
    channels: CaptureChannels,
    metrics: MetricsRecorder,
    sink: Box<dyn StatusSink>,
    identity: IdentityTuning,
    policy: MemoryPolicy,
    pressure: PressureLevel,
    deadlines: Deadlines,
    /// Band and channel of the current dwell; mesh listen retunes back here.
    current: (Band, u8),
    mesh_band: Band,
    /// Run-local identity, only used for the relay self-detection guard.
    station_mac: MacAddr,
    max_power: i8,
    hops_completed: u64,
    capture_drops_seen: u64,
    hasher: Option<Hasher>,
    started_at: DateTime<Utc>,
    epoch_ns: u64,
}

impl Scheduler {
    pub fn new(
        config: IrrblossConfig,
        mut radio: Box<dyn Radio>,
        clock: Clock,
        mut rng: SmallRng,
        channels: CaptureChannels,
        metrics: MetricsRecorder,
        sink: Box<dyn StatusSink>,
    ) -> Self {
        let identity = IdentityTuning {
            weights: CategoryWeights {
                apple: config.swarm.weights.apple,
                samsung: config.swarm.weights.samsung,
                legacy_iot: config.swarm.weights.legacy_iot,
                modern_generic: config.swarm.weights.modern_generic,
            },
            power_levels: config.swarm.power_levels.clone(),
            private_mac_modern_pct: config.swarm.private_mac_modern_pct,
            private_mac_common_pct: config.swarm.private_mac_common_pct,
            preferred_ssid_legacy_pct: config.swarm.preferred_ssid_legacy_pct,
            preferred_ssid_default_pct: config.swarm.preferred_ssid_default_pct,
        };
        let min_power = config.swarm.power_levels.iter().copied().min().unwrap_or(72);
        let max_power = config.swarm.power_levels.iter().copied().max().unwrap_or(82);
        let tuning = PoolTuning {
            active_target: config.swarm.active_target,
            dormant_target: config.swarm.dormant_target,
            revive_pct: config.swarm.revive_pct,
            min_tx_power: min_power,
            max_tx_power: max_power,
            populate_floor: config.swarm.populate_floor,
        };
        let policy = MemoryPolicy {
            high_water: config.swarm.memory_high_water,
            low_water: config.swarm.memory_low_water,
            dormant_shed: config.swarm.dormant_shed,
            active_shed: config.swarm.active_shed,
        };
        let corpus = SsidCorpus::with_seeds(
            config.swarm.corpus_max,
            Duration::from_secs(config.swarm.corpus_min_learn_interval_secs),
        );
        let relay = RelayCache::new(RelayTuning {
            max_messages: config.relay.max_messages,
            sender_window: Duration::from_secs(config.relay.sender_window_secs),
            message_ttl: Duration::from_secs(config.relay.message_ttl_secs),
            decay_timeout: Duration::from_secs(config.relay.decay_timeout_secs),
        });
        let cycler = BandCycler::new(&capabilities_from(&config.radio));
        let mesh_band = if config.radio.mesh_band == "5g" {
            Band::FiveGhz
        } else {
            Band::TwoGhz
        };

        // Boot near the top of the power table; the first dwell slot applies
        // a per-device level anyway.
        let boot_power = config.swarm.power_levels.get(4).copied().unwrap_or(max_power);
        if let Err(e) = radio.set_max_tx_power(boot_power) {
            debug!(error = %e, "initial power setting failed");
        }

        let mut pool = DevicePool::new(tuning);
        let admitted = pool.populate(&identity, &corpus, &mut rng, || {
            radio.free_memory_estimate()
        });
        info!(admitted, "virtual swarm populated");
        metrics.pool_active.set(pool.active_len() as i64);
        metrics.pool_dormant.set(pool.dormant_len() as i64);

        let station_mac = MacAddr::random_private(&mut rng);
        let now = clock.now_ns();
        let deadlines = Deadlines {
            // First hop fires immediately.
            hop_ns: now,
            lifecycle_ns: now
                + random_interval_ns(
                    &mut rng,
                    config.swarm.lifecycle_min_ms,
                    config.swarm.lifecycle_max_ms,
                ),
            mesh_listen_ns: now + config.relay.fast_listen_secs * NANOS_PER_SEC,
            snapshot_ns: now + config.telemetry.snapshot_interval_secs * NANOS_PER_SEC,
            pressure_ns: now + PRESSURE_INTERVAL.as_nanos() as u64,
        };
        let current = (
            Band::TwoGhz,
            config.radio.channels_2g.first().copied().unwrap_or(1),
        );

        Self {
            config,
            clock,
            rng,
            radio,
            cycler,
            pool,
            corpus,
            relay,
            channels,
            metrics,
            sink,
            identity,
            policy,
            pressure: PressureLevel::Normal,
            deadlines,
            current,
            mesh_band,
            station_mac,
            max_power,
            hops_completed: 0,
            capture_drops_seen: 0,
            hasher: None,
            started_at: Utc::now(),
            epoch_ns: now,
        }
    }

    /// Turns on the transmit-order state hash (simulation mode).
    pub fn with_state_hash(mut self) -> Self {
        self.hasher = Some(Hasher::new());
        self
    }

    pub fn hops_completed(&self) -> u64 {
        self.hops_completed
    }

    /// Consumes the scheduler and returns the hex state hash, when enabled.
    pub fn finalize_state_hash(self) -> Option<String> {
        self.hasher
            .map(|hasher| hex::encode(hasher.finalize().as_bytes()))
    }

    /// One duty pass. Every duty is checked against its own deadline, so a
    /// long dwell simply delays the others; nothing is ever cancelled.
    pub fn tick(&mut self) {
        let now = self.clock.now_ns();
        self.drain_learned_ssids(now);

        if now >= self.deadlines.pressure_ns {
            self.deadlines.pressure_ns = now + PRESSURE_INTERVAL.as_nanos() as u64;
            self.check_pressure();
        }

        if now >= self.deadlines.lifecycle_ns {
            self.deadlines.lifecycle_ns = now
                + random_interval_ns(
                    &mut self.rng,
                    self.config.swarm.lifecycle_min_ms,
                    self.config.swarm.lifecycle_max_ms,
                );
            self.lifecycle_burst();
        }

        if now >= self.deadlines.hop_ns {
            self.deadlines.hop_ns = now
                + random_interval_ns(
                    &mut self.rng,
                    self.config.traffic.hop_min_ms,
                    self.config.traffic.hop_max_ms,
                );
            self.hop();
        }

        if now >= self.deadlines.mesh_listen_ns {
            self.mesh_listen_window();
        }

        if now >= self.deadlines.snapshot_ns {
            self.deadlines.snapshot_ns =
                now + self.config.telemetry.snapshot_interval_secs * NANOS_PER_SEC;
            self.publish_snapshot();
        }

        self.clock.sleep(PACING_TICK);
    }

    /// Runs ticks until the flag is raised, then publishes a final snapshot.
    #[instrument(level = "info", name = "scheduler_run", skip(self, terminate))]
    pub fn run_until_terminated(&mut self, terminate: &AtomicBool) {
        info!(
            active = self.pool.active_len(),
            dual_band = self.cycler.is_dual_band(),
            "chaff scheduler started"
        );
        while !terminate.load(Ordering::Relaxed) {
            self.tick();
        }
        self.publish_snapshot();
        info!(hops = self.hops_completed, "chaff scheduler stopped");
    }

    /// Runs ticks until the given number of channel hops completed.
    pub fn run_hops(&mut self, hops: u64) {
        while self.hops_completed < hops {
            self.tick();
        }
    }

    fn drain_learned_ssids(&mut self, now_ns: u64) {
        while let Some(name) = self.channels.ssid.try_recv() {
            if !(self.config.features.passive_ssid_learning && self.config.features.ssid_replication)
            {
                continue;
            }
            if self.pressure != PressureLevel::Normal {
                continue;
            }
            if self.corpus.learn(&name, now_ns) {
                self.metrics.ssids_learned_total.inc();
                debug!(ssid = %name, "ssid learned from the air");
            }
        }
    }

    fn check_pressure(&mut self) {
        let Some(free) = self.radio.free_memory_estimate() else {
            return;
        };
        let level = self.policy.apply(free, &mut self.pool);
        if level != self.pressure {
            info!(from = %self.pressure, to = %level, free, "memory pressure changed");
        }
        self.pressure = level;
    }

    fn lifecycle_burst(&mut self) {
        let steps = self
            .rng
            .random_range(self.config.swarm.churn_burst_min..self.config.swarm.churn_burst_max);
        for _ in 0..steps {
            self.pool.churn_step(
                &self.identity,
                &self.corpus,
                self.pressure,
                self.config.features.lifecycle_churn,
                &mut self.rng,
            );
        }
        debug!(
            steps,
            active = self.pool.active_len(),
            dormant = self.pool.dormant_len(),
            "lifecycle burst"
        );
    }

    fn hop(&mut self) {
        let (band, channel) = self.cycler.next_hop();
        self.current = (band, channel);
        self.tune(band, channel);

        let started = self.clock.now_ns();
        self.dwell(band, channel);
        let elapsed = self.clock.now_ns().saturating_sub(started);
        self.metrics
            .dwell_duration_seconds
            .observe(elapsed as f64 / NANOS_PER_SEC as f64);
        self.hops_completed += 1;
    }

    fn dwell(&mut self, band: Band, channel: u8) {
        let on_mesh_channel = self.config.features.mesh_relay
            && band == self.mesh_band
            && channel == self.config.radio.mesh_channel;
        let mut run = DwellRun {
            radio: self.radio.as_mut(),
            pool: &mut self.pool,
            corpus: &self.corpus,
            relay: &self.relay,
            clock: &self.clock,
            rng: &mut self.rng,
            traffic: &self.config.traffic,
            features: &self.config.features,
            metrics: &self.metrics,
            hasher: self.hasher.as_mut(),
            on_mesh_channel,
            rebroadcast_pct: self.config.relay.rebroadcast_pct,
            max_power: self.max_power,
        };
        run.run(band, channel)
    }

    /// Retunes to the mesh channel and drains captured mesh frames into the
    /// cache for one fixed window, then goes back to the dwell channel. The
    /// next window comes sooner while the mesh is active.
    fn mesh_listen_window(&mut self) {
        let now = self.clock.now_ns();
        if !self.config.features.mesh_relay {
            self.deadlines.mesh_listen_ns = now + self.config.relay.slow_listen_secs * NANOS_PER_SEC;
            return;
        }

        let mesh_channel = self.config.radio.mesh_channel;
        self.tune(self.mesh_band, mesh_channel);

        let deadline = now + self.config.relay.listen_window_ms * NANOS_PER_MILLI;
        let mut ingested = 0usize;
        loop {
            while let Some(payload) = self.channels.mesh.try_recv() {
                if self
                    .relay
                    .ingest(payload, self.station_mac, self.clock.now_ns())
                {
                    ingested += 1;
                }
            }
            if self.clock.now_ns() >= deadline {
                break;
            }
            self.clock.sleep(PACING_TICK);
        }
        self.relay.prune(self.clock.now_ns());
        self.metrics
            .relay_cache_entries
            .set(self.relay.message_count() as i64);
        if ingested > 0 {
            debug!(ingested, cached = self.relay.message_count(), "mesh frames cached");
        }

        let interval_secs = if self.relay.mesh_active() {
            self.config.relay.fast_listen_secs
        } else {
            self.config.relay.slow_listen_secs
        };
        self.deadlines.mesh_listen_ns = self.clock.now_ns() + interval_secs * NANOS_PER_SEC;

        let (band, channel) = self.current;
        self.tune(band, channel);
    }

    fn tune(&mut self, band: Band, channel: u8) {
        if let Err(e) = self.radio.set_channel(band, channel) {
            self.metrics.tx_failures_total.inc();
            debug!(%band, channel, error = %e, "channel tune failed");
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            active_devices: self.pool.active_len(),
            dormant_devices: self.pool.dormant_len(),
            total_frames: self.metrics.frames_total.get() as u64,
            noise_frames: self.metrics.noise_frames_total.get() as u64,
            frames_2g: self.metrics.frames_2g_total.get() as u64,
            frames_5g: self.metrics.frames_5g_total.get() as u64,
            interactions: self.metrics.interactions_total.get() as u64,
            ssids_known: self.corpus.len(),
            last_learned_ssid: self.corpus.last_learned().map(str::to_string),
            relay_cache_entries: self.relay.message_count(),
            mesh_active: self.relay.mesh_active(),
            free_memory: self.radio.free_memory_estimate(),
            uptime_secs: self.clock.now_ns().saturating_sub(self.epoch_ns) / NANOS_PER_SEC,
            started_at: self.started_at,
        }
    }

    fn publish_snapshot(&mut self) {
        self.metrics.pool_active.set(self.pool.active_len() as i64);
        self.metrics.pool_dormant.set(self.pool.dormant_len() as i64);
        self.metrics
            .relay_cache_entries
            .set(self.relay.message_count() as i64);
        self.sync_capture_drops();
        let snapshot = self.snapshot();
        self.sink.publish(&snapshot);
    }

    fn sync_capture_drops(&mut self) {
        let dropped = self.channels.mesh.dropped() + self.channels.ssid.dropped();
        if dropped > self.capture_drops_seen {
            self.metrics
                .capture_drops_total
                .inc_by((dropped - self.capture_drops_seen) as f64);
            self.capture_drops_seen = dropped;
        }
    }
}

fn random_interval_ns(rng: &mut SmallRng, min_ms: u64, max_ms: u64) -> u64 {
    rng.random_range(min_ms..max_ms) * NANOS_PER_MILLI
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;

    use irrbloss_core::time::VirtualClock;
    use irrbloss_radio::{SimRadio, SimRadioHandle};
    use irrbloss_telemetry::snapshot::LogSink;

    fn test_config() -> IrrblossConfig {
        let mut config = IrrblossConfig::default();
        config.swarm.active_target = 40;
        config.swarm.dormant_target = 80;
        config.relay.fast_listen_secs = 1;
        config
    }

    fn build(seed: u64) -> (Scheduler, SimRadioHandle, CaptureChannels) {
        let config = test_config();
        let radio = SimRadio::new(capabilities_from(&config.radio));
        let handle = radio.handle();
        let channels = CaptureChannels::from_config(&config.relay);
        let feeds = channels.clone();
        let scheduler = Scheduler::new(
            config,
            Box::new(radio),
            Clock::simulated(VirtualClock::new(0)),
            SmallRng::seed_from_u64(seed),
            channels,
            MetricsRecorder::new(),
            Box::new(LogSink),
        );
        (scheduler, handle, feeds)
    }

    #[test]
    fn same_seed_produces_the_same_state_hash() {
        let (scheduler_a, _, _) = build(42);
        let (scheduler_b, _, _) = build(42);
        let mut scheduler_a = scheduler_a.with_state_hash();
        let mut scheduler_b = scheduler_b.with_state_hash();

        scheduler_a.run_hops(4);
        scheduler_b.run_hops(4);

        let hash_a = scheduler_a.finalize_state_hash().unwrap();
        let hash_b = scheduler_b.finalize_state_hash().unwrap();
        assert_eq!(hash_a, hash_b);
        assert!(!hash_a.is_empty());
    }

    #[test]
    fn different_seeds_diverge() {
        let (scheduler_a, _, _) = build(1);
        let (scheduler_b, _, _) = build(2);
        let mut scheduler_a = scheduler_a.with_state_hash();
        let mut scheduler_b = scheduler_b.with_state_hash();

        scheduler_a.run_hops(2);
        scheduler_b.run_hops(2);

        assert_ne!(
            scheduler_a.finalize_state_hash(),
            scheduler_b.finalize_state_hash()
        );
    }

    #[test]
    fn overheard_ssids_enter_the_corpus() {
        let (mut scheduler, _, feeds) = build(7);
        feeds.ssid.try_send("CoffeeHouse".to_string()).unwrap();

        scheduler.tick();

        assert_eq!(scheduler.corpus.len(), 31);
        assert_eq!(scheduler.corpus.last_learned(), Some("CoffeeHouse"));
        assert_eq!(scheduler.metrics.ssids_learned_total.get() as u64, 1);
    }

    #[test]
    fn low_memory_halts_growth_and_suspends_learning() {
        let (mut scheduler, handle, feeds) = build(8);
        handle.set_free_memory(Some(10_000));

        // Twelve hop intervals guarantee the one-second pressure deadline
        // fires even at the minimum hop cadence.
        scheduler.run_hops(12);

        assert_eq!(scheduler.pressure, PressureLevel::Critical);
        assert!(scheduler.pool.growth_halted());

        feeds.ssid.try_send("ShouldNotLearn".to_string()).unwrap();
        scheduler.tick();
        assert_eq!(scheduler.corpus.len(), 30);
        assert_eq!(scheduler.corpus.last_learned(), None);
    }

    #[test]
    fn mesh_frames_are_cached_during_the_listen_window() {
        let (mut scheduler, _, feeds) = build(9);
        let mut frame = vec![0xD0u8, 0x00];
        frame.resize(40, 0x55);
        feeds.mesh.try_send(Bytes::from(frame)).unwrap();

        // Enough hops to pass the first fast listen deadline.
        scheduler.run_hops(10);

        assert_eq!(scheduler.relay.message_count(), 1);
        assert!(scheduler.relay.mesh_active());
    }

    #[test]
    fn snapshot_reflects_pool_and_corpus_state() {
        let (scheduler, _, _) = build(10);
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.active_devices, 40);
        assert_eq!(snapshot.ssids_known, 30);
        assert!(!snapshot.mesh_active);
        assert_eq!(snapshot.total_frames, 0);
    }
}
