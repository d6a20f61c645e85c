//! ## irrbloss-frames::writer
//! **Growable bounds-checked frame writer**
//!
//! Grows on demand up to a hard cap and fails loudly instead of truncating.
//! Encoders hand out the finished frame as owned [`Bytes`]; there is no
//! shared scratch buffer anywhere in the transmit path.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Upper bound for any synthesized frame.
pub const MAX_FRAME_LEN: usize = 1024;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame would grow to {needed} bytes, max is {max}")]
    FrameTooLarge { needed: usize, max: usize },

    #[error("element {id} payload of {len} bytes exceeds the 255 byte field")]
    ElementTooLong { id: u8, len: usize },
}

pub struct FrameWriter {
    buf: BytesMut,
    max: usize,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::with_max(MAX_FRAME_LEN)
    }

    pub fn with_max(max: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max.min(128)),
            max,
        }
    }

    fn ensure(&mut self, additional: usize) -> Result<(), FrameError> {
        let needed = self.buf.len() + additional;
        if needed > self.max {
            return Err(FrameError::FrameTooLarge {
                needed,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<(), FrameError> {
        self.ensure(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    pub fn put_slice(&mut self, value: &[u8]) -> Result<(), FrameError> {
        self.ensure(value.len())?;
        self.buf.put_slice(value);
        Ok(())
    }

    /// Tag/length/value information element.
    pub fn element(&mut self, id: u8, payload: &[u8]) -> Result<(), FrameError> {
        if payload.len() > 255 {
            return Err(FrameError::ElementTooLong {
                id,
                len: payload.len(),
            });
        }
        self.ensure(2 + payload.len())?;
        self.buf.put_u8(id);
        self.buf.put_u8(payload.len() as u8);
        self.buf.put_slice(payload);
        Ok(())
    }

    /// Element ID 255 with an extension ID byte ahead of the payload.
    pub fn ext_element(&mut self, ext_id: u8, payload: &[u8]) -> Result<(), FrameError> {
        if payload.len() + 1 > 255 {
            return Err(FrameError::ElementTooLong {
                id: crate::elements::ELEM_EXTENSION,
                len: payload.len() + 1,
            });
        }
        self.ensure(3 + payload.len())?;
        self.buf.put_u8(crate::elements::ELEM_EXTENSION);
        self.buf.put_u8((payload.len() + 1) as u8);
        self.buf.put_u8(ext_id);
        self.buf.put_slice(payload);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}
