//! # irrbloss-engine
//!
//! The duty-cycle engine: band cycling, dwell transmit bursts, lifecycle
//! and pressure scheduling, mesh listen windows, and the production and
//! simulation runtimes that frontends call into.
//!
//! ### Key Submodules:
//! - `cycler`: strict band alternation over the configured hop plans
//! - `scheduler`: the duty loop and the dwell transmit bursts it runs
//! - `runtime`: production (live radio) and simulation (virtual) modes

pub mod cycler;
mod dwell;
pub mod error;
pub mod runtime;
pub mod scheduler;

pub use cycler::{capabilities_from, BandCycler};
pub use error::EngineError;
pub use runtime::{run_production_mode, run_simulation_mode, SimulationReport};
pub use scheduler::{CaptureChannels, Scheduler};
