//! ## irrbloss-frames::header
//! **24-byte management/data header assembly**

use irrbloss_core::mac::MacAddr;

use crate::writer::{FrameError, FrameWriter};

pub const HEADER_LEN: usize = 24;

/// Sequence-control bytes: the low eight sequence bits, then the upper four
/// in the second byte's low nibble. Fragment bits stay zero.
pub fn sequence_control(seq: u16) -> [u8; 2] {
    [(seq & 0xFF) as u8, ((seq >> 8) & 0x0F) as u8]
}

/// Reads a sequence number written by [`sequence_control`].
pub fn sequence_from_control(ctl: [u8; 2]) -> u16 {
    ctl[0] as u16 | (((ctl[1] & 0x0F) as u16) << 8)
}

pub(crate) fn push_header(
    w: &mut FrameWriter,
    frame_control: [u8; 2],
    duration: [u8; 2],
    addr1: MacAddr,
    addr2: MacAddr,
    addr3: MacAddr,
    seq: u16,
) -> Result<(), FrameError> {
    w.put_slice(&frame_control)?;
    w.put_slice(&duration)?;
    w.put_slice(&addr1.octets())?;
    w.put_slice(&addr2.octets())?;
    w.put_slice(&addr3.octets())?;
    w.put_slice(&sequence_control(seq))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_control_round_trips_all_12_bits() {
        for seq in [0u16, 1, 255, 256, 2048, 4095] {
            let ctl = sequence_control(seq);
            assert_eq!(sequence_from_control(ctl), seq);
            // Fragment nibble stays clear.
            assert_eq!(ctl[1] & 0xF0, 0);
        }
    }

    #[test]
    fn header_is_exactly_24_bytes() {
        let mut w = FrameWriter::new();
        push_header(
            &mut w,
            [0x40, 0x00],
            [0x00, 0x00],
            MacAddr::BROADCAST,
            MacAddr::new([2, 0, 0, 0, 0, 1]),
            MacAddr::BROADCAST,
            77,
        )
        .unwrap();
        assert_eq!(w.len(), HEADER_LEN);
    }
}
