//! ## irrbloss-telemetry::snapshot
//! **Periodic status publication**
//!
//! The scheduler assembles one of these on a fixed interval and hands it to
//! whatever sink is attached. Observation only; nothing flows back.

use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Clone, Debug)]
pub struct StatusSnapshot {
    pub active_devices: usize,
    pub dormant_devices: usize,
    pub total_frames: u64,
    pub noise_frames: u64,
    pub frames_2g: u64,
    pub frames_5g: u64,
    pub interactions: u64,
    pub ssids_known: usize,
    pub last_learned_ssid: Option<String>,
    pub relay_cache_entries: usize,
    pub mesh_active: bool,
    pub free_memory: Option<u64>,
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
}

/// Display seam. The default sink logs; a front panel or web page would
/// implement this instead.
pub trait StatusSink: Send {
    fn publish(&mut self, snapshot: &StatusSnapshot);
}

/// Sink that writes one structured log line per snapshot.
#[derive(Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        info!(
            active = snapshot.active_devices,
            dormant = snapshot.dormant_devices,
            frames = snapshot.total_frames,
            noise = snapshot.noise_frames,
            frames_2g = snapshot.frames_2g,
            frames_5g = snapshot.frames_5g,
            interactions = snapshot.interactions,
            ssids = snapshot.ssids_known,
            last_ssid = snapshot.last_learned_ssid.as_deref().unwrap_or("-"),
            relay_cache = snapshot.relay_cache_entries,
            mesh = snapshot.mesh_active,
            free_memory = snapshot.free_memory,
            uptime_secs = snapshot.uptime_secs,
            "status"
        );
    }
}
