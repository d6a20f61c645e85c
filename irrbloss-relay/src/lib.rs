//! # irrbloss-relay
//!
//! Passive capture handling: the cheap capture-context classifier that feeds
//! the bounded handoff queues, and the relay cache that remembers third-party
//! mesh frames for occasional rebroadcast.
//!
//! ### Key Submodules:
//! - `classify`: allocation-after-match frame taps for the capture context
//! - `cache`: deduplicating FIFO message cache with sender tracking and decay

pub mod cache;
pub mod classify;

pub use cache::{RelayCache, RelayTuning};
pub use classify::{CaptureTap, MeshFilter};
