//! ## irrbloss-engine::runtime
//! **Production and simulation entry points**
//!
//! Both modes assemble the same scheduler; they differ only in the radio
//! backend, the clock and the rng seeding. Frontends call these functions
//! and own nothing but argument parsing.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use opentelemetry::KeyValue;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{error, info, instrument};

use irrbloss_config::IrrblossConfig;
use irrbloss_core::time::{Clock, VirtualClock};
use irrbloss_radio::{run_capture, PcapRadio, SimRadio};
use irrbloss_telemetry::logging::EventLogger;
use irrbloss_telemetry::metrics::MetricsRecorder;
use irrbloss_telemetry::snapshot::LogSink;

use crate::cycler::capabilities_from;
use crate::error::EngineError;
use crate::scheduler::{CaptureChannels, Scheduler};

/// Runs the production mode: live radio, wall-clock time, entropy-seeded
/// rng. Returns once a shutdown signal stops the scheduler.
#[instrument(level = "info", name = "run_production_mode", skip(config, metrics))]
pub async fn run_production_mode(
    config: IrrblossConfig,
    metrics: MetricsRecorder,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let interface = config.radio.interface.clone();
    let snaplen = config.radio.capture_snaplen;
    let capture_enabled = config.features.passive_ssid_learning || config.features.mesh_relay;

    // No radio, no degraded mode. Everything after this point is recoverable.
    let radio = PcapRadio::open(&interface, capabilities_from(&config.radio))?;

    let channels = CaptureChannels::from_config(&config.relay);
    let tap = channels.tap(&config.relay);
    let terminate = Arc::new(AtomicBool::new(false));

    let capture_handle = if capture_enabled {
        let capture_terminate = Arc::clone(&terminate);
        let capture_interface = interface.clone();
        Some(tokio::task::spawn_blocking(move || {
            let _guard = tracing::info_span!("capture_task").entered();
            if let Err(e) = run_capture(&capture_interface, snaplen, &capture_terminate, |frame| {
                tap.on_frame(frame)
            }) {
                error!(error = %e, "capture loop failed");
            }
        }))
    } else {
        info!("passive capture disabled by feature switches");
        None
    };

    let shutdown_flag = Arc::clone(&terminate);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown_flag.store(true, Ordering::Relaxed);
        }
    });

    let mut scheduler = Scheduler::new(
        config,
        Box::new(radio),
        Clock::monotonic(),
        SmallRng::from_rng(&mut rand::rng()),
        channels,
        metrics,
        Box::new(LogSink),
    );
    let scheduler_terminate = Arc::clone(&terminate);
    let scheduler_handle = tokio::task::spawn_blocking(move || {
        let _guard = tracing::info_span!("scheduler_task").entered();
        scheduler.run_until_terminated(&scheduler_terminate)
    });

    scheduler_handle.await?;

    // The capture loop polls the flag on its pcap timeout; give it the stop
    // signal even when the scheduler ended on its own.
    terminate.store(true, Ordering::Relaxed);
    if let Some(handle) = capture_handle {
        let _ = handle.await;
    }
    Ok(())
}

/// What a finished simulation run produced.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub hops: u64,
    pub total_frames: u64,
    pub noise_frames: u64,
    pub frames_2g: u64,
    pub frames_5g: u64,
    pub interactions: u64,
    pub state_hash: String,
}

/// Runs the simulation mode: in-memory radio, virtual clock starting at
/// zero and a seeded rng, so the transmit stream and its hash are a pure
/// function of configuration and seed.
#[instrument(level = "info", name = "run_simulation_mode", skip(config, metrics))]
pub async fn run_simulation_mode(
    config: IrrblossConfig,
    hops: u64,
    seed: u64,
    validate_hash: Option<&str>,
    metrics: MetricsRecorder,
) -> Result<SimulationReport, Box<dyn std::error::Error + Send + Sync>> {
    let radio = SimRadio::new(capabilities_from(&config.radio));
    let channels = CaptureChannels::from_config(&config.relay);
    let scheduler_metrics = metrics.clone();
    let mut scheduler = Scheduler::new(
        config,
        Box::new(radio),
        Clock::simulated(VirtualClock::new(0)),
        SmallRng::seed_from_u64(seed),
        channels,
        scheduler_metrics,
        Box::new(LogSink),
    )
    .with_state_hash();

    let (hops_done, state_hash) = tokio::task::spawn_blocking(move || {
        let _guard = tracing::info_span!("simulation_task").entered();
        scheduler.run_hops(hops);
        let hops_done = scheduler.hops_completed();
        let hash = scheduler.finalize_state_hash().unwrap_or_default();
        (hops_done, hash)
    })
    .await?;

    let report = SimulationReport {
        hops: hops_done,
        total_frames: metrics.frames_total.get() as u64,
        noise_frames: metrics.noise_frames_total.get() as u64,
        frames_2g: metrics.frames_2g_total.get() as u64,
        frames_5g: metrics.frames_5g_total.get() as u64,
        interactions: metrics.interactions_total.get() as u64,
        state_hash,
    };
    info!(
        hops = report.hops,
        frames = report.total_frames,
        hash = %report.state_hash,
        "simulation complete"
    );

    if let Some(expected) = validate_hash {
        if report.state_hash != expected {
            generate_bug_report(&format!(
                "Simulation error: state hash mismatch!\nExpected: {}\nGot: {}",
                expected, report.state_hash
            ));
            return Err(Box::new(EngineError::HashMismatch {
                expected: expected.to_string(),
                actual: report.state_hash,
            }));
        }
    }

    EventLogger::log_event(
        "simulation_complete",
        vec![
            KeyValue::new("hops", report.hops.to_string()),
            KeyValue::new("seed", seed.to_string()),
            KeyValue::new("final_hash", report.state_hash.clone()),
        ],
    )
    .await;

    Ok(report)
}

/// Generates a bug report file with the given report details.
fn generate_bug_report(report: &str) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let filename = format!("bug_report_{}.txt", now);
    match File::create(&filename) {
        Ok(mut file) => {
            if let Err(e) = file.write_all(report.as_bytes()) {
                eprintln!("Failed to write bug report: {:?}", e);
            } else {
                println!("Bug report written to {}", filename);
            }
        }
        Err(e) => eprintln!("Failed to create bug report file: {:?}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> IrrblossConfig {
        let mut config = IrrblossConfig::default();
        config.swarm.active_target = 40;
        config.swarm.dormant_target = 80;
        config
    }

    #[tokio::test]
    async fn simulation_is_deterministic_per_seed() {
        let report_a = run_simulation_mode(small_config(), 3, 9, None, MetricsRecorder::new())
            .await
            .unwrap();
        let report_b = run_simulation_mode(small_config(), 3, 9, None, MetricsRecorder::new())
            .await
            .unwrap();

        assert_eq!(report_a.state_hash, report_b.state_hash);
        assert_eq!(report_a.hops, 3);
        assert!(report_a.total_frames > 0);
        assert!(report_a.noise_frames > 0);
    }

    #[tokio::test]
    async fn validation_succeeds_against_a_recorded_hash() {
        let first = run_simulation_mode(small_config(), 2, 11, None, MetricsRecorder::new())
            .await
            .unwrap();
        let second = run_simulation_mode(
            small_config(),
            2,
            11,
            Some(&first.state_hash),
            MetricsRecorder::new(),
        )
        .await
        .unwrap();
        assert_eq!(second.state_hash, first.state_hash);
    }

    #[tokio::test]
    async fn hash_mismatch_is_surfaced_as_an_error() {
        let err = run_simulation_mode(
            small_config(),
            1,
            5,
            Some("deadbeef"),
            MetricsRecorder::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::HashMismatch { .. })
        ));

        // The mismatch path writes a bug report file; don't leave it behind.
        for entry in std::fs::read_dir(".").into_iter().flatten().flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("bug_report_") && name.ends_with(".txt") {
                let _ = std::fs::remove_file(entry.path());
            }
        }
    }
}
