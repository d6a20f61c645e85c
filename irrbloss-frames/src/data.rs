//! ## irrbloss-frames::data
//! **Protected QoS data chaff**

use bytes::Bytes;
use rand::Rng;

use irrbloss_core::device::VirtualDevice;

use crate::header::push_header;
use crate::writer::{FrameError, FrameWriter};

/// QoS data frame flagged ToDS + Protected, carrying a random payload sized
/// like real CCMP traffic. The ciphertext is junk; nothing decrypts it.
pub fn encrypted_data<R: Rng>(device: &VirtualDevice, rng: &mut R) -> Result<Bytes, FrameError> {
    let mut w = FrameWriter::new();
    push_header(
        &mut w,
        [0x88, 0x41],
        [0x00, 0x00],
        device.bssid_target,
        device.mac,
        device.bssid_target,
        device.sequence.current(),
    )?;
    // QoS control: random TID, no A-MSDU.
    w.put_slice(&[rng.random_range(0..8u8), 0x00])?;
    let len = rng.random_range(64..512usize);
    let mut payload = vec![0u8; len];
    rng.fill(payload.as_mut_slice());
    w.put_slice(&payload)?;
    Ok(w.into_bytes())
}
