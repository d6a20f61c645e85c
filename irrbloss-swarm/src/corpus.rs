//! ## irrbloss-swarm::corpus
//! **Seed and passively learned SSID names**
//!
//! Indices into the corpus stay valid for the life of the process: entries
//! are only appended or overwritten in place, never removed, so a device's
//! probe preference can hold a bare index.

use std::time::Duration;

use rand::Rng;

use irrbloss_core::device::{DeviceGeneration, Platform, VirtualDevice};
use irrbloss_frames::mgmt::ProbeSsid;

/// Names common enough that probing for them identifies nobody.
pub const SEED_SSIDS: [&str; 30] = [
    "xfinitywifi",
    "Starbucks WiFi",
    "attwifi",
    "Google Starbucks",
    "iPhone",
    "AndroidAP",
    "Guest",
    "linksys",
    "netgear",
    "Free Public WiFi",
    "T-Mobile",
    "Home",
    "Office",
    "Spectrum",
    "optimumwifi",
    "CoxWiFi",
    "Lowe's Wi-Fi",
    "Target Guest Wi-Fi",
    "McDonalds Free WiFi",
    "BURGER KING FREE WIFI",
    "Subway WiFi",
    "PaneraBread_WiFi",
    "Airport_Free_WiFi",
    "Marriott_Guest",
    "Hilton_Honors",
    "Walmart_WiFi",
    "DIRECTV_WIFI",
    "HP-Print-B2-LaserJet",
    "Roku-829",
    "Sonos_WiFi",
];

/// Probability that an eligible device wildcards instead of probing a name.
const WILDCARD_PCT: u8 = 40;

#[derive(Clone, Debug)]
struct SsidEntry {
    name: String,
    seeded: bool,
}

pub struct SsidCorpus {
    entries: Vec<SsidEntry>,
    max_entries: usize,
    min_learn_interval_ns: u64,
    last_overwrite_ns: Option<u64>,
    /// Rotates over non-seed slots so overwrites recycle the oldest learn.
    overwrite_cursor: usize,
    learned_total: u64,
    last_learned: Option<String>,
}

impl SsidCorpus {
    pub fn with_seeds(max_entries: usize, min_learn_interval: Duration) -> Self {
        let entries = SEED_SSIDS
            .iter()
            .map(|name| SsidEntry {
                name: (*name).to_string(),
                seeded: true,
            })
            .collect();
        Self {
            entries,
            max_entries: max_entries.max(SEED_SSIDS.len()),
            min_learn_interval_ns: min_learn_interval.as_nanos() as u64,
            last_overwrite_ns: None,
            overwrite_cursor: SEED_SSIDS.len(),
            learned_total: 0,
            last_learned: None,
        }
    }

    /// Corpus without seeds, for tests and opt-out deployments.
    pub fn empty(max_entries: usize, min_learn_interval: Duration) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            min_learn_interval_ns: min_learn_interval.as_nanos() as u64,
            last_overwrite_ns: None,
            overwrite_cursor: 0,
            learned_total: 0,
            last_learned: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }

    pub fn random_name<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.entries.len());
        Some(self.entries[index].name.as_str())
    }

    pub fn learned_total(&self) -> u64 {
        self.learned_total
    }

    pub fn last_learned(&self) -> Option<&str> {
        self.last_learned.as_deref()
    }

    /// Adds a passively observed name. Duplicates are ignored. When the
    /// corpus is full, the oldest learned entry is overwritten instead,
    /// rate-limited to one overwrite per `min_learn_interval`; seeds are
    /// never evicted. Returns whether the corpus changed.
    pub fn learn(&mut self, name: &str, now_ns: u64) -> bool {
        if name.is_empty() || name.len() > 32 {
            return false;
        }
        if self.entries.iter().any(|entry| entry.name == name) {
            return false;
        }

        if self.entries.len() < self.max_entries {
            self.entries.push(SsidEntry {
                name: name.to_string(),
                seeded: false,
            });
            self.record_learn(name);
            return true;
        }

        // Full: recycle a non-seed slot, no more often than the interval.
        if let Some(last) = self.last_overwrite_ns {
            if now_ns.saturating_sub(last) < self.min_learn_interval_ns {
                return false;
            }
        }
        let start = self.overwrite_cursor;
        let len = self.entries.len();
        for offset in 0..len {
            let index = (start + offset) % len;
            if !self.entries[index].seeded {
                self.entries[index].name = name.to_string();
                self.overwrite_cursor = (index + 1) % len;
                self.last_overwrite_ns = Some(now_ns);
                self.record_learn(name);
                return true;
            }
        }
        false
    }

    fn record_learn(&mut self, name: &str) {
        self.learned_total += 1;
        self.last_learned = Some(name.to_string());
    }

    /// SSID policy for one probe request: legacy or platform-other devices
    /// wildcard some of the time, everything else probes a directed name
    /// from its preference, a random corpus entry, or a throwaway fallback.
    pub fn choose_probe_ssid<R: Rng>(&self, device: &VirtualDevice, rng: &mut R) -> ProbeSsid {
        let wildcard_eligible = device.generation == DeviceGeneration::Legacy
            || device.platform == Platform::Other;
        if wildcard_eligible && rng.random_range(0..100) < WILDCARD_PCT {
            return ProbeSsid::Wildcard;
        }
        if let Some(name) = device.preferred_ssid.and_then(|index| self.get(index)) {
            return ProbeSsid::Directed(name.to_string());
        }
        if let Some(name) = self.random_name(rng) {
            return ProbeSsid::Directed(name.to_string());
        }
        let mut fallback = String::with_capacity(7);
        for _ in 0..7 {
            fallback.push(rng.random_range(b'a'..b'z') as char);
        }
        ProbeSsid::Directed(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrbloss_core::device::SequenceCounter;
    use irrbloss_core::mac::MacAddr;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const MINUTE_NS: u64 = 60 * 1_000_000_000;

    fn corpus(max: usize) -> SsidCorpus {
        SsidCorpus::with_seeds(max, Duration::from_secs(30))
    }

    #[test]
    fn starts_with_the_seed_set() {
        let corpus = corpus(100);
        assert_eq!(corpus.len(), 30);
        assert_eq!(corpus.get(0), Some("xfinitywifi"));
        assert_eq!(corpus.get(29), Some("Sonos_WiFi"));
    }

    #[test]
    fn learns_new_names_and_dedupes() {
        let mut corpus = corpus(100);
        assert!(corpus.learn("CoffeeHouse", 0));
        assert!(!corpus.learn("CoffeeHouse", 0));
        assert!(!corpus.learn("xfinitywifi", 0));
        assert_eq!(corpus.len(), 31);
        assert_eq!(corpus.learned_total(), 1);
        assert_eq!(corpus.last_learned(), Some("CoffeeHouse"));
    }

    #[test]
    fn rejects_oversized_and_empty_names() {
        let mut corpus = corpus(100);
        assert!(!corpus.learn("", 0));
        assert!(!corpus.learn(&"x".repeat(33), 0));
        assert!(corpus.learn(&"x".repeat(32), 0));
    }

    #[test]
    fn full_corpus_overwrites_oldest_learned_respecting_interval() {
        let mut corpus = corpus(32);
        assert!(corpus.learn("first", 0));
        assert!(corpus.learn("second", 0));
        assert_eq!(corpus.len(), 32);

        // Full now. Immediate overwrite is throttled.
        assert!(!corpus.learn("third", 10));
        // After the interval the oldest learned entry is recycled.
        assert!(corpus.learn("third", MINUTE_NS));
        assert_eq!(corpus.get(30), Some("third"));
        assert_eq!(corpus.get(31), Some("second"));

        // Next overwrite rotates to the following learned slot.
        assert!(corpus.learn("fourth", 2 * MINUTE_NS));
        assert_eq!(corpus.get(31), Some("fourth"));

        // Seeds survive every overwrite.
        assert_eq!(corpus.get(0), Some("xfinitywifi"));
        assert_eq!(corpus.len(), 32);
    }

    #[test]
    fn all_seed_corpus_never_overwrites() {
        let mut corpus = SsidCorpus::with_seeds(30, Duration::from_secs(0));
        assert!(!corpus.learn("NewName", MINUTE_NS));
        assert_eq!(corpus.len(), 30);
    }

    fn device(generation: DeviceGeneration, platform: Platform) -> VirtualDevice {
        VirtualDevice {
            mac: MacAddr::new([2, 0, 0, 0, 0, 1]),
            bssid_target: MacAddr::new([0, 0x11, 0x32, 0, 0, 2]),
            sequence: SequenceCounter::new(0),
            generation,
            platform,
            preferred_ssid: None,
            tx_power: 72,
            has_connected: false,
        }
    }

    #[test]
    fn modern_devices_always_probe_directed() {
        let corpus = corpus(100);
        let mut rng = SmallRng::seed_from_u64(5);
        let dev = device(DeviceGeneration::Modern, Platform::Android);
        for _ in 0..100 {
            assert!(matches!(
                corpus.choose_probe_ssid(&dev, &mut rng),
                ProbeSsid::Directed(_)
            ));
        }
    }

    #[test]
    fn preferred_index_wins_when_set() {
        let corpus = corpus(100);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut dev = device(DeviceGeneration::Common, Platform::Ios);
        dev.preferred_ssid = Some(8);
        for _ in 0..20 {
            assert_eq!(
                corpus.choose_probe_ssid(&dev, &mut rng),
                ProbeSsid::Directed("netgear".to_string())
            );
        }
    }

    #[test]
    fn legacy_devices_wildcard_sometimes() {
        let corpus = corpus(100);
        let mut rng = SmallRng::seed_from_u64(17);
        let dev = device(DeviceGeneration::Legacy, Platform::Other);
        let wildcards = (0..500)
            .filter(|_| corpus.choose_probe_ssid(&dev, &mut rng) == ProbeSsid::Wildcard)
            .count();
        // Nominal 40%.
        assert!((120..=280).contains(&wildcards), "wildcards {}", wildcards);
    }

    #[test]
    fn empty_corpus_falls_back_to_a_throwaway_name() {
        let corpus = SsidCorpus::empty(100, Duration::from_secs(30));
        let mut rng = SmallRng::seed_from_u64(9);
        let dev = device(DeviceGeneration::Modern, Platform::Android);
        match corpus.choose_probe_ssid(&dev, &mut rng) {
            ProbeSsid::Directed(name) => {
                assert_eq!(name.len(), 7);
                assert!(name.bytes().all(|b| b.is_ascii_lowercase()));
            }
            ProbeSsid::Wildcard => panic!("expected a directed fallback"),
        }
    }
}
