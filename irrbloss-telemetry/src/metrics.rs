//! ## irrbloss-telemetry::metrics
//! **Prometheus registry for the transmit and capture paths**

use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub frames_total: Counter,
    pub noise_frames_total: Counter,
    pub frames_2g_total: Counter,
    pub frames_5g_total: Counter,
    pub interactions_total: Counter,
    pub beacons_total: Counter,
    pub ssids_learned_total: Counter,
    pub relays_total: Counter,
    pub tx_failures_total: Counter,
    pub capture_drops_total: Counter,
    pub pool_active: IntGauge,
    pub pool_dormant: IntGauge,
    pub relay_cache_entries: IntGauge,
    pub dwell_duration_seconds: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let frames_total =
            Counter::new("irrbloss_frames_total", "Frames transmitted, all kinds").unwrap();
        let noise_frames_total =
            Counter::new("irrbloss_noise_frames_total", "Junk noise probes").unwrap();
        let frames_2g_total =
            Counter::new("irrbloss_frames_2g_total", "Frames sent on 2.4 GHz").unwrap();
        let frames_5g_total =
            Counter::new("irrbloss_frames_5g_total", "Frames sent on 5 GHz").unwrap();
        let interactions_total = Counter::new(
            "irrbloss_interactions_total",
            "Completed auth/assoc/data interactions",
        )
        .unwrap();
        let beacons_total =
            Counter::new("irrbloss_beacons_total", "Ambient beacons emitted").unwrap();
        let ssids_learned_total = Counter::new(
            "irrbloss_ssids_learned_total",
            "SSIDs learned from passive capture",
        )
        .unwrap();
        let relays_total =
            Counter::new("irrbloss_relays_total", "Mesh frames rebroadcast").unwrap();
        let tx_failures_total =
            Counter::new("irrbloss_tx_failures_total", "Failed transmit calls").unwrap();
        let capture_drops_total = Counter::new(
            "irrbloss_capture_drops_total",
            "Captured frames dropped on full handoff queues",
        )
        .unwrap();

        let pool_active = IntGauge::new("irrbloss_pool_active", "Active pool size").unwrap();
        let pool_dormant = IntGauge::new("irrbloss_pool_dormant", "Dormant pool size").unwrap();
        let relay_cache_entries =
            IntGauge::new("irrbloss_relay_cache_entries", "Cached mesh messages").unwrap();

        let dwell_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "irrbloss_dwell_duration_seconds",
                "Wall time of one dwell burst",
            )
            .buckets(vec![0.05, 0.1, 0.2, 0.4, 0.8, 1.6]),
        )
        .unwrap();

        for collector in [
            &frames_total,
            &noise_frames_total,
            &frames_2g_total,
            &frames_5g_total,
            &interactions_total,
            &beacons_total,
            &ssids_learned_total,
            &relays_total,
            &tx_failures_total,
            &capture_drops_total,
        ] {
            registry.register(Box::new(collector.clone())).unwrap();
        }
        registry.register(Box::new(pool_active.clone())).unwrap();
        registry.register(Box::new(pool_dormant.clone())).unwrap();
        registry
            .register(Box::new(relay_cache_entries.clone()))
            .unwrap();
        registry
            .register(Box::new(dwell_duration_seconds.clone()))
            .unwrap();

        Self {
            registry,
            frames_total,
            noise_frames_total,
            frames_2g_total,
            frames_5g_total,
            interactions_total,
            beacons_total,
            ssids_learned_total,
            relays_total,
            tx_failures_total,
            capture_drops_total,
            pool_active,
            pool_dormant,
            relay_cache_entries,
            dwell_duration_seconds,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
