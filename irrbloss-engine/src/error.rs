//! ## irrbloss-engine::error

use thiserror::Error;

use irrbloss_frames::FrameError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// An internal encoder produced an invalid frame. Always a bug; the
    /// dwell logs it and skips the slot instead of transmitting garbage.
    #[error("frame construction failed: {0}")]
    Frame(#[from] FrameError),

    #[error("simulation state hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
