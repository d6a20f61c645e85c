//! # irrbloss-swarm
//!
//! The virtual crowd: weighted identity generation, the SSID corpus the
//! crowd probes for, the active/dormant device pools with lifecycle churn,
//! and the two-tier memory-pressure policy that shrinks them.
//!
//! ### Key Submodules:
//! - `identity`: weighted vendor-category identity roll with era mapping
//! - `corpus`: seed + passively learned SSID names
//! - `pool`: active/dormant pools with by-value moves
//! - `pressure`: free-memory thresholds and shed fractions

pub mod corpus;
pub mod identity;
pub mod pool;
pub mod pressure;

pub use corpus::SsidCorpus;
pub use identity::{generate_identity, CategoryWeights, IdentityTuning};
pub use pool::{DevicePool, PoolTuning};
pub use pressure::{MemoryPolicy, PressureLevel};
