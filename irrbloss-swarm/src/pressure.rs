//! ## irrbloss-swarm::pressure
//! **Memory pressure policy driving pool shrinkage**

use std::fmt;

use tracing::warn;

use crate::pool::DevicePool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PressureLevel {
    Normal,
    Elevated,
    Critical,
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressureLevel::Normal => write!(f, "normal"),
            PressureLevel::Elevated => write!(f, "elevated"),
            PressureLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Thresholds are in bytes of free memory as reported by the radio backend.
#[derive(Clone, Debug)]
pub struct MemoryPolicy {
    pub high_water: u64,
    pub low_water: u64,
    pub dormant_shed: f64,
    pub active_shed: f64,
}

impl Default for MemoryPolicy {
    fn default() -> Self {
        Self {
            high_water: 25_000,
            low_water: 15_000,
            dormant_shed: 0.30,
            active_shed: 0.15,
        }
    }
}

impl MemoryPolicy {
    pub fn classify(&self, free_memory: u64) -> PressureLevel {
        if free_memory < self.low_water {
            PressureLevel::Critical
        } else if free_memory < self.high_water {
            PressureLevel::Elevated
        } else {
            PressureLevel::Normal
        }
    }

    /// Applies one memory observation to the pool. Elevated sheds the oldest
    /// slice of the dormant pool; Critical also prunes the active pool and
    /// halts lifecycle growth. The halt is sticky: it survives Elevated and
    /// lifts only once the estimate recovers to Normal.
    pub fn apply(&self, free_memory: u64, pool: &mut DevicePool) -> PressureLevel {
        let level = self.classify(free_memory);
        match level {
            PressureLevel::Normal => pool.resume_growth(),
            PressureLevel::Elevated => {
                let dropped = pool.shed_dormant(self.dormant_shed);
                if dropped > 0 {
                    warn!(free_memory, dropped, "memory pressure: shed dormant devices");
                }
            }
            PressureLevel::Critical => {
                let dormant = pool.shed_dormant(self.dormant_shed);
                let active = pool.shed_active(self.active_shed);
                pool.halt_growth();
                warn!(
                    free_memory,
                    dormant, active, "critical memory pressure: pools pruned"
                );
            }
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SsidCorpus;
    use crate::identity::IdentityTuning;
    use crate::pool::PoolTuning;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn classification_uses_strict_watermarks() {
        let policy = MemoryPolicy::default();
        assert_eq!(policy.classify(30_000), PressureLevel::Normal);
        assert_eq!(policy.classify(25_000), PressureLevel::Normal);
        assert_eq!(policy.classify(24_999), PressureLevel::Elevated);
        assert_eq!(policy.classify(15_000), PressureLevel::Elevated);
        assert_eq!(policy.classify(14_999), PressureLevel::Critical);
        assert_eq!(policy.classify(0), PressureLevel::Critical);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(PressureLevel::Normal < PressureLevel::Elevated);
        assert!(PressureLevel::Elevated < PressureLevel::Critical);
    }

    fn pool_with_dormant() -> DevicePool {
        let identity = IdentityTuning::default();
        let corpus = SsidCorpus::with_seeds(100, Duration::from_secs(30));
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = DevicePool::new(PoolTuning {
            active_target: 20,
            dormant_target: 40,
            ..PoolTuning::default()
        });
        pool.populate(&identity, &corpus, &mut rng, || None);
        // Churn with revival disabled: each step retires one device into the
        // dormant pool and admits a fresh one.
        for _ in 0..10 {
            pool.churn_step(&identity, &corpus, PressureLevel::Normal, false, &mut rng);
        }
        assert_eq!(pool.active_len(), 20);
        assert_eq!(pool.dormant_len(), 10);
        pool
    }

    #[test]
    fn elevated_sheds_dormant_only() {
        let policy = MemoryPolicy::default();
        let mut pool = pool_with_dormant();
        assert_eq!(policy.apply(20_000, &mut pool), PressureLevel::Elevated);
        assert_eq!(pool.dormant_len(), 7);
        assert_eq!(pool.active_len(), 20);
        assert!(!pool.growth_halted());
    }

    #[test]
    fn critical_prunes_both_pools_and_halts_growth() {
        let policy = MemoryPolicy::default();
        let mut pool = pool_with_dormant();
        assert_eq!(policy.apply(10_000, &mut pool), PressureLevel::Critical);
        assert_eq!(pool.dormant_len(), 7);
        assert_eq!(pool.active_len(), 17);
        assert!(pool.growth_halted());

        // The halt is sticky through Elevated.
        assert_eq!(policy.apply(20_000, &mut pool), PressureLevel::Elevated);
        assert!(pool.growth_halted());
        assert_eq!(pool.dormant_len(), 5);

        // Recovery to Normal lifts it.
        assert_eq!(policy.apply(30_000, &mut pool), PressureLevel::Normal);
        assert!(!pool.growth_halted());
    }
}
