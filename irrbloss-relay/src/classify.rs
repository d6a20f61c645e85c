//! ## irrbloss-relay::classify
//! **Capture-context frame taps**
//!
//! Everything here runs in whatever context the radio delivers received
//! frames on. The discipline is strict: classify with cheap byte checks
//! first, allocate only for a frame that matched, hand off through a
//! non-blocking bounded queue, never touch shared state.

use bytes::Bytes;

use irrbloss_core::queue::HandoffQueue;
use irrbloss_frames::parse::FrameView;

/// Byte-level filter for the third-party mesh protocol: vendor-specific
/// action frames carrying a known OUI at a fixed offset.
#[derive(Clone, Debug)]
pub struct MeshFilter {
    pub oui: [u8; 3],
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for MeshFilter {
    fn default() -> Self {
        Self {
            oui: [0x18, 0xFE, 0x34],
            min_len: 39,
            max_len: 310,
        }
    }
}

impl MeshFilter {
    /// Length bounds, action frame control, vendor-specific category code,
    /// then the OUI. No allocation, no parsing beyond fixed offsets.
    pub fn matches(&self, frame: &[u8]) -> bool {
        frame.len() >= self.min_len.max(28)
            && frame.len() <= self.max_len
            && frame[0] == 0xD0
            && frame[24] == 127
            && frame[25..28] == self.oui
    }
}

/// Returns a learnable SSID from a probe request: present, 2..=31 bytes,
/// valid UTF-8 with no control characters. Wildcard and single-byte names
/// identify nothing worth imitating.
pub fn probe_ssid(frame: &[u8]) -> Option<String> {
    let view = FrameView::parse(frame)?;
    if !view.is_probe_request() {
        return None;
    }
    let ssid = view.first_ssid()?;
    if !(2..=31).contains(&ssid.len()) {
        return None;
    }
    let name = std::str::from_utf8(ssid).ok()?;
    if name.chars().any(char::is_control) {
        return None;
    }
    Some(name.to_string())
}

/// The receive-side entry point handed to the radio backend.
pub struct CaptureTap {
    filter: MeshFilter,
    mesh_queue: HandoffQueue<Bytes>,
    ssid_queue: HandoffQueue<String>,
}

impl CaptureTap {
    pub fn new(
        filter: MeshFilter,
        mesh_queue: HandoffQueue<Bytes>,
        ssid_queue: HandoffQueue<String>,
    ) -> Self {
        Self {
            filter,
            mesh_queue,
            ssid_queue,
        }
    }

    /// Classifies one received frame and enqueues it if interesting.
    /// Queue-full drops silently; the queues count their own drops.
    pub fn on_frame(&self, frame: &[u8]) {
        if self.filter.matches(frame) {
            let _ = self.mesh_queue.try_send(Bytes::copy_from_slice(frame));
            return;
        }
        if let Some(ssid) = probe_ssid(frame) {
            let _ = self.ssid_queue.try_send(ssid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrbloss_core::band::Band;
    use irrbloss_core::device::{DeviceGeneration, Platform, SequenceCounter, VirtualDevice};
    use irrbloss_core::mac::MacAddr;
    use irrbloss_frames::mgmt::{probe_request, ProbeSsid};

    fn mesh_frame(len: usize) -> Vec<u8> {
        let mut frame = vec![0u8; len];
        frame[0] = 0xD0;
        frame[24] = 127;
        frame[25..28].copy_from_slice(&[0x18, 0xFE, 0x34]);
        frame
    }

    #[test]
    fn filter_accepts_only_the_mesh_shape() {
        let filter = MeshFilter::default();
        assert!(filter.matches(&mesh_frame(39)));
        assert!(filter.matches(&mesh_frame(310)));
        assert!(!filter.matches(&mesh_frame(38)));
        assert!(!filter.matches(&mesh_frame(311)));

        let mut wrong_fc = mesh_frame(60);
        wrong_fc[0] = 0x40;
        assert!(!filter.matches(&wrong_fc));

        let mut wrong_category = mesh_frame(60);
        wrong_category[24] = 4;
        assert!(!filter.matches(&wrong_category));

        let mut wrong_oui = mesh_frame(60);
        wrong_oui[25] = 0x00;
        assert!(!filter.matches(&wrong_oui));
    }

    fn device() -> VirtualDevice {
        VirtualDevice {
            mac: MacAddr::new([0x02, 0, 0, 0, 0, 1]),
            bssid_target: MacAddr::new([0x00, 0x11, 0x32, 0, 0, 2]),
            sequence: SequenceCounter::new(0),
            generation: DeviceGeneration::Common,
            platform: Platform::Android,
            preferred_ssid: None,
            tx_power: 74,
            has_connected: false,
        }
    }

    #[test]
    fn probe_tap_learns_directed_names_only() {
        let dev = device();
        let directed = probe_request(
            &dev,
            &ProbeSsid::Directed("CoffeeHouse".into()),
            Band::TwoGhz,
            6,
        )
        .unwrap();
        assert_eq!(probe_ssid(&directed), Some("CoffeeHouse".to_string()));

        let wildcard = probe_request(&dev, &ProbeSsid::Wildcard, Band::TwoGhz, 6).unwrap();
        assert_eq!(probe_ssid(&wildcard), None);

        let single = probe_request(&dev, &ProbeSsid::Directed("x".into()), Band::TwoGhz, 6).unwrap();
        assert_eq!(probe_ssid(&single), None);
    }

    #[test]
    fn probe_tap_ignores_other_frame_types() {
        assert_eq!(probe_ssid(&mesh_frame(60)), None);
        assert_eq!(probe_ssid(&[0x40, 0x00]), None);
    }

    #[test]
    fn tap_routes_to_the_right_queue_and_drops_on_full() {
        let mesh_queue = HandoffQueue::with_capacity(2);
        let ssid_queue = HandoffQueue::with_capacity(2);
        let tap = CaptureTap::new(MeshFilter::default(), mesh_queue.clone(), ssid_queue.clone());

        tap.on_frame(&mesh_frame(60));
        assert_eq!(mesh_queue.len(), 1);
        assert_eq!(ssid_queue.len(), 0);

        let dev = device();
        let probe = probe_request(
            &dev,
            &ProbeSsid::Directed("CoffeeHouse".into()),
            Band::TwoGhz,
            6,
        )
        .unwrap();
        tap.on_frame(&probe);
        assert_eq!(ssid_queue.len(), 1);

        tap.on_frame(&mesh_frame(60));
        tap.on_frame(&mesh_frame(60));
        assert_eq!(mesh_queue.len(), 2);
        assert_eq!(mesh_queue.dropped(), 1);
    }
}
