//! ## irrbloss-radio::error
//! **Radio error taxonomy**

use thiserror::Error;

use irrbloss_core::band::Band;

#[derive(Debug, Error)]
pub enum RadioError {
    #[error("band {band} not supported by this radio")]
    UnsupportedBand { band: Band },

    #[error("channel {channel} is not valid on {band}")]
    InvalidChannel { band: Band, channel: u8 },

    #[error("frame of {len} bytes exceeds the injection limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("radio i/o failed: {0}")]
    Io(String),

    #[error("channel tune failed: {0}")]
    Tune(String),

    #[error("radio initialization failed: {0}")]
    Init(String),
}
