//! ## irrbloss-swarm::pool
//! **Active and dormant device pools with lifecycle churn**
//!
//! The pool is the single owner of every [`VirtualDevice`]. Devices move
//! between the active and dormant vectors by value, so a device can never be
//! scheduled twice. Both vectors are oldest-first: shedding under memory
//! pressure drains from the front.

use rand::Rng;
use tracing::{debug, info};

use irrbloss_core::device::VirtualDevice;

use crate::corpus::SsidCorpus;
use crate::identity::{generate_identity, IdentityTuning};
use crate::pressure::PressureLevel;

#[derive(Clone, Debug)]
pub struct PoolTuning {
    pub active_target: usize,
    pub dormant_target: usize,
    /// Percentage of admissions served by reviving a dormant device.
    pub revive_pct: u8,
    pub min_tx_power: i8,
    pub max_tx_power: i8,
    /// Initial population stops once free memory drops below this.
    pub populate_floor: u64,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            active_target: 1500,
            dormant_target: 3000,
            revive_pct: 50,
            min_tx_power: 72,
            max_tx_power: 82,
            populate_floor: 20_000,
        }
    }
}

pub struct DevicePool {
    active: Vec<VirtualDevice>,
    dormant: Vec<VirtualDevice>,
    growth_halted: bool,
    tuning: PoolTuning,
}

impl DevicePool {
    pub fn new(tuning: PoolTuning) -> Self {
        Self {
            active: Vec::new(),
            dormant: Vec::new(),
            growth_halted: false,
            tuning,
        }
    }

    pub fn active(&self) -> &[VirtualDevice] {
        &self.active
    }

    /// Mutable view for the transmit path, which advances sequence counters
    /// and flips association state in place.
    pub fn active_mut(&mut self) -> &mut [VirtualDevice] {
        &mut self.active
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn dormant_len(&self) -> usize {
        self.dormant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn growth_halted(&self) -> bool {
        self.growth_halted
    }

    pub fn halt_growth(&mut self) {
        if !self.growth_halted {
            info!(
                active = self.active.len(),
                dormant = self.dormant.len(),
                "lifecycle growth halted"
            );
        }
        self.growth_halted = true;
    }

    pub fn resume_growth(&mut self) {
        if self.growth_halted {
            info!("lifecycle growth resumed");
        }
        self.growth_halted = false;
    }

    /// Seeds the active pool up to target. The memory estimate is consulted
    /// after every admission; population stops early once it falls below the
    /// floor. Returns how many devices were admitted.
    pub fn populate<R, F>(
        &mut self,
        identity: &IdentityTuning,
        corpus: &SsidCorpus,
        rng: &mut R,
        mut free_memory: F,
    ) -> usize
    where
        R: Rng,
        F: FnMut() -> Option<u64>,
    {
        self.active.reserve(self.tuning.active_target);
        self.dormant.reserve(self.tuning.dormant_target);
        let mut admitted = 0;
        while self.active.len() < self.tuning.active_target {
            self.active.push(generate_identity(identity, corpus, rng));
            admitted += 1;
            if let Some(free) = free_memory() {
                if free < self.tuning.populate_floor {
                    debug!(free, admitted, "population stopped below memory floor");
                    break;
                }
            }
        }
        admitted
    }

    /// One churn step: retire a random active device, then admit a
    /// replacement unless growth is halted. The retiree is retained in the
    /// dormant pool only when there is room and pressure is normal;
    /// otherwise it is discarded for good.
    pub fn churn_step<R: Rng>(
        &mut self,
        identity: &IdentityTuning,
        corpus: &SsidCorpus,
        pressure: PressureLevel,
        revive_enabled: bool,
        rng: &mut R,
    ) {
        if !self.active.is_empty() {
            let index = rng.random_range(0..self.active.len());
            let leaving = self.active.remove(index);
            if self.dormant.len() < self.tuning.dormant_target
                && pressure == PressureLevel::Normal
            {
                self.dormant.push(leaving);
            }
        }

        if self.growth_halted {
            return;
        }

        let mut arriving = if revive_enabled
            && !self.dormant.is_empty()
            && rng.random_range(0..100) < self.tuning.revive_pct
        {
            self.revive(rng)
        } else {
            generate_identity(identity, corpus, rng)
        };
        arriving.tx_power = arriving
            .tx_power
            .clamp(self.tuning.min_tx_power, self.tuning.max_tx_power);
        self.active.push(arriving);
    }

    /// Wakes a random dormant device. Its sequence counter jumps ahead as if
    /// it kept transmitting elsewhere, power occasionally drifts a notch,
    /// and any association state is forgotten.
    fn revive<R: Rng>(&mut self, rng: &mut R) -> VirtualDevice {
        let index = rng.random_range(0..self.dormant.len());
        let mut woken = self.dormant.remove(index);
        woken.sequence.advance(rng.random_range(50..500));
        if rng.random_range(0..100) < 30 {
            woken.tx_power += (rng.random_range(0i8..3) - 1) * 2;
        }
        woken.has_connected = false;
        woken
    }

    /// Drops the oldest `fraction` of the dormant pool. Returns the count.
    pub fn shed_dormant(&mut self, fraction: f64) -> usize {
        let count = (self.dormant.len() as f64 * fraction) as usize;
        self.dormant.drain(..count);
        count
    }

    /// Drops the oldest `fraction` of the active pool. Returns the count.
    pub fn shed_active(&mut self, fraction: f64) -> usize {
        let count = (self.active.len() as f64 * fraction) as usize;
        self.active.drain(..count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrbloss_core::mac::MacAddr;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::time::Duration;

    fn corpus() -> SsidCorpus {
        SsidCorpus::with_seeds(100, Duration::from_secs(30))
    }

    fn small_pool(active_target: usize, dormant_target: usize) -> DevicePool {
        DevicePool::new(PoolTuning {
            active_target,
            dormant_target,
            ..PoolTuning::default()
        })
    }

    #[test]
    fn populate_fills_to_target() {
        let mut pool = small_pool(40, 80);
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let admitted = pool.populate(&identity, &corpus(), &mut rng, || None);
        assert_eq!(admitted, 40);
        assert_eq!(pool.active_len(), 40);
        assert_eq!(pool.dormant_len(), 0);
    }

    #[test]
    fn populate_stops_below_memory_floor() {
        let mut pool = small_pool(1000, 80);
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut remaining: u64 = 30_000;
        let admitted = pool.populate(&identity, &corpus(), &mut rng, || {
            remaining = remaining.saturating_sub(1_000);
            Some(remaining)
        });
        // Floor is 20 000: the estimate dips under it on the eleventh check.
        assert_eq!(admitted, 11);
        assert_eq!(pool.active_len(), 11);
    }

    #[test]
    fn pools_stay_disjoint_across_churn() {
        let mut pool = small_pool(30, 60);
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let corpus = corpus();
        pool.populate(&identity, &corpus, &mut rng, || None);
        for _ in 0..500 {
            pool.churn_step(&identity, &corpus, PressureLevel::Normal, true, &mut rng);
        }
        let active: HashSet<MacAddr> = pool.active.iter().map(|d| d.mac).collect();
        let dormant: HashSet<MacAddr> = pool.dormant.iter().map(|d| d.mac).collect();
        assert!(active.is_disjoint(&dormant));
        // Churn is one-out-one-in, so the active pool holds its size.
        assert_eq!(pool.active_len(), 30);
        assert!(pool.dormant_len() <= 60);
    }

    #[test]
    fn retirees_are_discarded_under_pressure() {
        let mut pool = small_pool(20, 60);
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let corpus = corpus();
        pool.populate(&identity, &corpus, &mut rng, || None);
        for _ in 0..50 {
            pool.churn_step(&identity, &corpus, PressureLevel::Elevated, false, &mut rng);
        }
        assert_eq!(pool.dormant_len(), 0);
    }

    #[test]
    fn halted_growth_shrinks_the_active_pool() {
        let mut pool = small_pool(20, 60);
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let corpus = corpus();
        pool.populate(&identity, &corpus, &mut rng, || None);
        pool.halt_growth();
        for _ in 0..5 {
            pool.churn_step(&identity, &corpus, PressureLevel::Critical, true, &mut rng);
        }
        assert_eq!(pool.active_len(), 15);
        pool.resume_growth();
        pool.churn_step(&identity, &corpus, PressureLevel::Normal, true, &mut rng);
        assert_eq!(pool.active_len(), 16);
    }

    #[test]
    fn revival_jumps_sequence_and_clears_association() {
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let corpus = corpus();
        let mut pool = DevicePool::new(PoolTuning {
            active_target: 4,
            dormant_target: 8,
            revive_pct: 100,
            ..PoolTuning::default()
        });
        let mut seed = generate_identity(&identity, &corpus, &mut rng);
        seed.sequence = irrbloss_core::device::SequenceCounter::new(100);
        seed.has_connected = true;
        let mac = seed.mac;
        pool.dormant.push(seed);

        pool.churn_step(&identity, &corpus, PressureLevel::Normal, true, &mut rng);
        let woken = pool
            .active
            .iter()
            .find(|d| d.mac == mac)
            .expect("revived device lands in the active pool");
        let jumped = woken.sequence.current();
        assert!((150..600).contains(&jumped), "sequence {}", jumped);
        assert!(!woken.has_connected);
        assert!((72..=82).contains(&woken.tx_power));
    }

    #[test]
    fn shedding_drains_from_the_front() {
        let identity = IdentityTuning::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let corpus = corpus();
        let mut pool = small_pool(10, 20);
        for _ in 0..10 {
            pool.dormant.push(generate_identity(&identity, &corpus, &mut rng));
        }
        let newest = pool.dormant.last().map(|d| d.mac);
        assert_eq!(pool.shed_dormant(0.30), 3);
        assert_eq!(pool.dormant_len(), 7);
        assert_eq!(pool.dormant.last().map(|d| d.mac), newest);

        for _ in 0..10 {
            pool.active.push(generate_identity(&identity, &corpus, &mut rng));
        }
        assert_eq!(pool.shed_active(0.15), 1);
        assert_eq!(pool.active_len(), 9);
    }
}
