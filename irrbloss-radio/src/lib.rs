//! # irrbloss-radio
//!
//! The radio boundary: one object-safe trait the engine transmits through,
//! a live pcap-injection backend for monitor-mode interfaces, and an
//! in-memory backend for simulation and tests.
//!
//! ### Key Submodules:
//! - `error`: the radio error taxonomy
//! - `pcap`: monitor-mode injection via libpcap plus the capture loop
//! - `sim`: recording backend with scripted memory and failure behavior

pub mod error;
pub mod pcap;
pub mod sim;

pub use error::RadioError;
pub use pcap::{run_capture, PcapRadio};
pub use sim::{SimRadio, SimRadioHandle, TxRecord};

use irrbloss_core::band::Band;

/// Everything the engine needs from a radio. Transmit and tune failures are
/// expected and transient; callers count them and move on. Only failing to
/// open the radio at startup is fatal.
pub trait Radio: Send {
    /// Tunes to a channel. The backend validates band support and channel
    /// membership.
    fn set_channel(&mut self, band: Band, channel: u8) -> Result<(), RadioError>;

    /// Transmit power ceiling in quarter-dBm units (72..=82 in practice).
    fn set_max_tx_power(&mut self, level: i8) -> Result<(), RadioError>;

    /// Injects one raw 802.11 frame.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError>;

    /// Free-memory estimate in bytes, if the platform exposes one.
    fn free_memory_estimate(&self) -> Option<u64>;
}
