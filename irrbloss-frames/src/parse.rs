//! ## irrbloss-frames::parse
//! **Borrowed frame view and element walk**
//!
//! Zero-copy accessors over captured frames. Malformed or truncated input
//! yields `None` or an early end of iteration; the capture path treats both
//! as not-of-interest.

use irrbloss_core::mac::MacAddr;

use crate::elements::ELEM_SSID;
use crate::header::{sequence_from_control, HEADER_LEN};

#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        (data.len() >= HEADER_LEN).then_some(Self { data })
    }

    pub fn frame_control(&self) -> [u8; 2] {
        [self.data[0], self.data[1]]
    }

    pub fn is_probe_request(&self) -> bool {
        self.data[0] == 0x40
    }

    pub fn is_action(&self) -> bool {
        self.data[0] == 0xD0
    }

    fn mac_at(&self, offset: usize) -> MacAddr {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&self.data[offset..offset + 6]);
        MacAddr(octets)
    }

    pub fn addr1(&self) -> MacAddr {
        self.mac_at(4)
    }

    pub fn addr2(&self) -> MacAddr {
        self.mac_at(10)
    }

    pub fn addr3(&self) -> MacAddr {
        self.mac_at(16)
    }

    pub fn sequence_number(&self) -> u16 {
        sequence_from_control([self.data[22], self.data[23]])
    }

    pub fn body(&self) -> &'a [u8] {
        &self.data[HEADER_LEN..]
    }

    /// Elements directly after the header (probe request layout).
    pub fn elements(&self) -> ElementIter<'a> {
        ElementIter { rest: self.body() }
    }

    /// Elements starting at `offset` into the frame, for frame types with a
    /// fixed part ahead of the element list.
    pub fn elements_from(&self, offset: usize) -> ElementIter<'a> {
        ElementIter {
            rest: self.data.get(offset..).unwrap_or(&[]),
        }
    }

    pub fn first_ssid(&self) -> Option<&'a [u8]> {
        self.elements()
            .find(|element| element.id == ELEM_SSID)
            .map(|element| element.data)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    pub id: u8,
    pub data: &'a [u8],
}

pub struct ElementIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Element<'a>> {
        if self.rest.len() < 2 {
            return None;
        }
        let id = self.rest[0];
        let len = self.rest[1] as usize;
        if self.rest.len() < 2 + len {
            // Truncated tail, stop rather than read past the frame.
            return None;
        }
        let data = &self.rest[2..2 + len];
        self.rest = &self.rest[2 + len..];
        Some(Element { id, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_body(body: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x40, 0x00, 0x00, 0x00];
        frame.extend_from_slice(&[0xFF; 6]);
        frame.extend_from_slice(&[0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        frame.extend_from_slice(&[0xFF; 6]);
        frame.extend_from_slice(&[0x2A, 0x01]);
        frame.extend_from_slice(body);
        frame
    }

    #[test]
    fn rejects_frames_shorter_than_a_header() {
        assert!(FrameView::parse(&[0x40; 23]).is_none());
        assert!(FrameView::parse(&[]).is_none());
    }

    #[test]
    fn reads_addresses_and_sequence() {
        let frame = frame_with_body(&[]);
        let view = FrameView::parse(&frame).unwrap();
        assert!(view.is_probe_request());
        assert_eq!(view.addr1(), MacAddr::BROADCAST);
        assert_eq!(
            view.addr2(),
            MacAddr::new([0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE])
        );
        assert_eq!(view.sequence_number(), 0x012A);
    }

    #[test]
    fn walks_elements_and_finds_ssid() {
        let frame = frame_with_body(&[0x00, 0x04, b'c', b'a', b'f', b'e', 0x01, 0x01, 0x82]);
        let view = FrameView::parse(&frame).unwrap();
        assert_eq!(view.first_ssid(), Some(&b"cafe"[..]));
        assert_eq!(view.elements().count(), 2);
    }

    #[test]
    fn truncated_element_ends_iteration() {
        // Claims 9 payload bytes, provides 2.
        let frame = frame_with_body(&[0x01, 0x09, 0x82, 0x84]);
        let view = FrameView::parse(&frame).unwrap();
        assert_eq!(view.elements().count(), 0);
        assert!(view.first_ssid().is_none());
    }

    #[test]
    fn zero_length_elements_are_yielded() {
        let frame = frame_with_body(&[0x00, 0x00, 0x01, 0x01, 0x82]);
        let view = FrameView::parse(&frame).unwrap();
        let first = view.elements().next().unwrap();
        assert_eq!(first.id, 0);
        assert!(first.data.is_empty());
    }
}
