//! ## irrbloss-core::time
//! **Monotonic and virtual time sources**
//!
//! Every deadline in the scheduler and every decay window in the relay cache
//! compares nanosecond counts from a [`Clock`]. Production uses the
//! monotonic variant; simulation and tests use [`VirtualClock`] so waits
//! advance time instead of consuming it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>, // Nanoseconds
}

impl VirtualClock {
    pub fn new(start_ns: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    pub fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    pub fn advance(&self, delta: Duration) {
        self.offset.fetch_add(delta.as_nanos() as u64, Ordering::Release);
    }
}

#[derive(Clone)]
pub enum Clock {
    Monotonic { epoch: Instant },
    Virtual(VirtualClock),
}

impl Clock {
    pub fn monotonic() -> Self {
        Clock::Monotonic {
            epoch: Instant::now(),
        }
    }

    pub fn simulated(clock: VirtualClock) -> Self {
        Clock::Virtual(clock)
    }

    pub fn now_ns(&self) -> u64 {
        match self {
            Clock::Monotonic { epoch } => epoch.elapsed().as_nanos() as u64,
            Clock::Virtual(clock) => clock.now_ns(),
        }
    }

    /// Sleeps for `dur` in real time, or advances the virtual clock by the
    /// same amount.
    pub fn sleep(&self, dur: Duration) {
        match self {
            Clock::Monotonic { .. } => std::thread::sleep(dur),
            Clock::Virtual(clock) => clock.advance(dur),
        }
    }
}
