//! # irrbloss-frames
//!
//! Stateless IEEE 802.11 frame construction and element parsing.
//!
//! Every encoder is a pure function from a device identity (plus band and
//! channel context) to an owned byte sequence, ready for radiotap-wrapped
//! injection. Era enforcement is built into the encoders: a `Legacy` device
//! can never emit VHT or HE elements, a `Modern` device always advertises
//! HE where the frame type carries capabilities.
//!
//! ### Key Submodules:
//! - `writer`: growable bounds-checked frame writer
//! - `elements`: element IDs and fixed capability/vendor payloads
//! - `mgmt`: probe request, authentication, association request, beacon,
//!   noise probe
//! - `data`: protected QoS data chaff
//! - `parse`: borrowed frame view + element walk for the capture taps

pub mod data;
pub mod elements;
pub mod header;
pub mod mgmt;
pub mod parse;
pub mod writer;

pub use writer::{FrameError, FrameWriter, MAX_FRAME_LEN};
