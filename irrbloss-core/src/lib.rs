//! # irrbloss-core
//!
//! Foundation layer shared by every irrbloss crate: MAC addressing, band and
//! channel models, virtual device identities, time sources, and the bounded
//! capture handoff queue.
//!
//! ### Key Submodules:
//! - `mac`: MAC address newtype with locally-administered helpers
//! - `band`: band/channel model and the runtime radio capability descriptor
//! - `device`: virtual device identity and the 12-bit sequence counter
//! - `time`: monotonic and virtual clocks for deterministic runs
//! - `queue`: drop-on-full handoff between capture callbacks and the scheduler

pub mod band;
pub mod device;
pub mod mac;
pub mod queue;
pub mod time;

pub mod prelude {
    pub use crate::band::*;
    pub use crate::device::*;
    pub use crate::mac::*;
    pub use crate::queue::*;
    pub use crate::time::*;
}
