//! ## irrbloss-radio::pcap
//! **Monitor-mode injection and capture via libpcap**
//!
//! The interface is expected to already be in monitor mode; channel tuning
//! and power go through `iw`, injection and capture through a pcap handle.

use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use pcap::{Active, Capture, Device};
use tracing::{debug, error, info};

use irrbloss_core::band::{channel_to_frequency, Band, RadioCapabilities};

use crate::error::RadioError;
use crate::Radio;

/// Radiotap header requesting injection without ACK expectation.
pub const RTH_NO_ACK: [u8; 10] = [
    0x00, 0x00, /* radiotap version and padding */
    0x0a, 0x00, /* radiotap header length */
    0x00, 0x80, 0x00, 0x00, /* bitmap */
    0x28, 0x00, /* tx flags */
];

/// Upper bound on a single injected 802.11 frame, radiotap excluded.
pub const MAX_INJECT_LEN: usize = 2048;

pub struct PcapRadio {
    interface: String,
    handle: Capture<Active>,
    capabilities: RadioCapabilities,
    current_power: Option<i8>,
    scratch: Vec<u8>,
}

impl PcapRadio {
    /// Opens an injection handle on a monitor-mode interface. Failure here
    /// is fatal to the caller; there is no degraded mode without a radio.
    pub fn open(interface: &str, capabilities: RadioCapabilities) -> Result<Self, RadioError> {
        let device = Device::list()
            .map_err(|e| RadioError::Init(e.to_string()))?
            .into_iter()
            .find(|d| d.name == interface)
            .ok_or_else(|| RadioError::Init(format!("interface '{}' not found", interface)))?;

        let handle = Capture::from_device(device)
            .map_err(|e| RadioError::Init(e.to_string()))?
            .promisc(false)
            .snaplen((RTH_NO_ACK.len() + MAX_INJECT_LEN) as i32)
            .open()
            .map_err(|e| RadioError::Init(e.to_string()))?;

        info!(interface, "opened injection handle");
        Ok(Self {
            interface: interface.to_string(),
            handle,
            capabilities,
            current_power: None,
            scratch: Vec::with_capacity(RTH_NO_ACK.len() + MAX_INJECT_LEN),
        })
    }

    fn validate(&self, band: Band, channel: u8) -> Result<u16, RadioError> {
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
        channel_to_frequency(band, channel).ok_or(RadioError::InvalidChannel { band, channel })
    }
}

impl Radio for PcapRadio {
    fn set_channel(&mut self, band: Band, channel: u8) -> Result<(), RadioError> {
        let freq = self.validate(band, channel)?;
        let status = Command::new("iw")
            .args(["dev", &self.interface, "set", "freq", &freq.to_string()])
            .status()
            .map_err(|e| RadioError::Tune(e.to_string()))?;
        if !status.success() {
            return Err(RadioError::Tune(format!(
                "iw rejected freq {} on {}",
                freq, self.interface
            )));
        }
        debug!(%band, channel, freq, "tuned");
        Ok(())
    }

    fn set_max_tx_power(&mut self, level: i8) -> Result<(), RadioError> {
        if self.current_power == Some(level) {
            return Ok(());
        }
        // Quarter-dBm level to mBm.
        let mbm = level as i32 * 25;
        let status = Command::new("iw")
            .args([
                "dev",
                &self.interface,
                "set",
                "txpower",
                "fixed",
                &mbm.to_string(),
            ])
            .status()
            .map_err(|e| RadioError::Io(e.to_string()))?;
        if !status.success() {
            return Err(RadioError::Io(format!(
                "iw rejected txpower {} mBm on {}",
                mbm, self.interface
            )));
        }
        self.current_power = Some(level);
        Ok(())
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if frame.len() > MAX_INJECT_LEN {
            return Err(RadioError::FrameTooLarge {
                len: frame.len(),
                max: MAX_INJECT_LEN,
            });
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(&RTH_NO_ACK);
        self.scratch.extend_from_slice(frame);
        self.handle
            .sendpacket(self.scratch.as_slice())
            .map_err(|e| RadioError::Io(e.to_string()))
    }

    fn free_memory_estimate(&self) -> Option<u64> {
        read_mem_available("/proc/meminfo")
    }
}

/// MemAvailable from a meminfo-format file, in bytes.
fn read_mem_available(path: &str) -> Option<u64> {
    let contents = std::fs::read_to_string(path).ok()?;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

/// Blocking capture loop. Strips the radiotap prefix and hands each raw
/// 802.11 frame to the callback until `terminate` is set. Runs on its own
/// thread; the callback must follow capture-context discipline (classify
/// and enqueue, nothing more).
pub fn run_capture<F>(
    interface: &str,
    snaplen: usize,
    terminate: &AtomicBool,
    mut callback: F,
) -> Result<(), RadioError>
where
    F: FnMut(&[u8]) + Send,
{
    let device = Device::list()
        .map_err(|e| RadioError::Init(e.to_string()))?
        .into_iter()
        .find(|d| d.name == interface)
        .ok_or_else(|| RadioError::Init(format!("interface '{}' not found", interface)))?;

    let mut cap = Capture::from_device(device)
        .map_err(|e| RadioError::Init(e.to_string()))?
        .promisc(true)
        .snaplen(snaplen as i32)
        .timeout(1000)
        .open()
        .map_err(|e| RadioError::Init(e.to_string()))?;

    info!(interface, "capture loop started");
    while !terminate.load(Ordering::Relaxed) {
        match cap.next_packet() {
            Ok(packet) => {
                if let Some(frame) = strip_radiotap(packet.data) {
                    callback(frame);
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                error!(interface, error = %e, "capture loop stopped");
                break;
            }
        }
    }
    Ok(())
}

/// Returns the 802.11 frame behind a radiotap header, or `None` for a
/// truncated or non-radiotap buffer.
fn strip_radiotap(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 4 || data[0] != 0 {
        return None;
    }
    let header_len = u16::from_le_bytes([data[2], data[3]]) as usize;
    if header_len < 8 {
        return None;
    }
    data.get(header_len..).filter(|rest| !rest.is_empty())
}
