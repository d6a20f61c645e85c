//! # irrbloss-telemetry
//!
//! Logging, metrics and the periodic status snapshot.

pub mod logging;
pub mod metrics;
pub mod snapshot;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
pub use snapshot::{LogSink, StatusSink, StatusSnapshot};
