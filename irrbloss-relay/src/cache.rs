//! ## irrbloss-relay::cache
//! **Deduplicating message cache for mesh rebroadcast**
//!
//! Owned and mutated by the scheduling loop only. The capture context never
//! sees this type; frames arrive through the handoff queue.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use tracing::debug;

use irrbloss_core::mac::MacAddr;
use irrbloss_frames::parse::FrameView;

#[derive(Clone, Debug)]
pub struct RelayTuning {
    pub max_messages: usize,
    /// A sender unseen for this long is forgotten.
    pub sender_window: Duration,
    /// A message unrefreshed for this long is dropped.
    pub message_ttl: Duration,
    /// Nothing at all observed for this long clears the whole cache.
    pub decay_timeout: Duration,
}

impl Default for RelayTuning {
    fn default() -> Self {
        Self {
            max_messages: 40,
            sender_window: Duration::from_secs(300),
            message_ttl: Duration::from_secs(600),
            decay_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Clone, Debug)]
struct CachedFrame {
    payload: Bytes,
    first_seen_ns: u64,
    last_seen_ns: u64,
}

#[derive(Clone, Copy, Debug)]
struct SenderRecord {
    mac: MacAddr,
    last_seen_ns: u64,
}

pub struct RelayCache {
    messages: VecDeque<CachedFrame>,
    senders: Vec<SenderRecord>,
    mesh_active: bool,
    last_observed_ns: Option<u64>,
    tuning: RelayTuning,
}

impl RelayCache {
    pub fn new(tuning: RelayTuning) -> Self {
        Self {
            messages: VecDeque::with_capacity(tuning.max_messages),
            senders: Vec::new(),
            mesh_active: false,
            last_observed_ns: None,
            tuning,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    pub fn mesh_active(&self) -> bool {
        self.mesh_active
    }

    /// One captured frame. Returns true if it was new to the cache.
    ///
    /// Duplicate payloads (exact byte equality, linear scan over the small
    /// cache) refresh `last_seen` instead of inserting. At capacity the
    /// oldest entry is evicted first. The sender address is recorded unless
    /// it is our own transmit MAC echoed back at us.
    pub fn ingest(&mut self, payload: Bytes, own_mac: MacAddr, now_ns: u64) -> bool {
        self.mesh_active = true;
        self.last_observed_ns = Some(now_ns);

        if let Some(view) = FrameView::parse(&payload) {
            let sender = view.addr2();
            if sender != own_mac {
                match self.senders.iter_mut().find(|r| r.mac == sender) {
                    Some(record) => record.last_seen_ns = now_ns,
                    None => self.senders.push(SenderRecord {
                        mac: sender,
                        last_seen_ns: now_ns,
                    }),
                }
            }
        }

        if let Some(entry) = self.messages.iter_mut().find(|m| m.payload == payload) {
            entry.last_seen_ns = now_ns;
            return false;
        }
        if self.messages.len() >= self.tuning.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(CachedFrame {
            payload,
            first_seen_ns: now_ns,
            last_seen_ns: now_ns,
        });
        true
    }

    /// Expiry sweep, run every scheduling tick. Individual senders and
    /// messages age out on their own windows; total silence past the decay
    /// timeout invalidates the whole cache at once, since a stale mesh
    /// message rebroadcast after the mesh vanished helps nobody.
    pub fn prune(&mut self, now_ns: u64) {
        if let Some(last) = self.last_observed_ns {
            if now_ns.saturating_sub(last) >= as_ns(self.tuning.decay_timeout) {
                if self.mesh_active {
                    debug!(
                        messages = self.messages.len(),
                        senders = self.senders.len(),
                        "mesh decayed, dropping relay cache"
                    );
                }
                self.messages.clear();
                self.senders.clear();
                self.mesh_active = false;
                return;
            }
        }
        let sender_window = as_ns(self.tuning.sender_window);
        self.senders
            .retain(|r| now_ns.saturating_sub(r.last_seen_ns) < sender_window);
        let message_ttl = as_ns(self.tuning.message_ttl);
        self.messages
            .retain(|m| now_ns.saturating_sub(m.last_seen_ns) < message_ttl);
    }

    /// A random cached payload for rebroadcast.
    pub fn pick_random<R: Rng>(&self, rng: &mut R) -> Option<Bytes> {
        if self.messages.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.messages.len());
        self.messages.get(index).map(|m| m.payload.clone())
    }

    /// Age of the oldest cached message, for snapshots.
    pub fn oldest_first_seen_ns(&self) -> Option<u64> {
        self.messages.front().map(|m| m.first_seen_ns)
    }
}

fn as_ns(duration: Duration) -> u64 {
    duration.as_nanos() as u64
}
