use crate::pool::EnergyPool;

/// Narrow (`i32`) energy protocol. Every value crossing it is saturated to
/// `i32::MAX`.
pub trait LegacyEnergy {
    fn energy_stored(&self) -> i32;
    fn max_energy_stored(&self) -> i32;
    fn can_extract(&self) -> bool;
    fn can_receive(&self) -> bool;
    fn receive_energy(&mut self, max_receive: i32, simulate: bool) -> i32;
    fn extract_energy(&mut self, max_extract: i32, simulate: bool) -> i32;
}

impl LegacyEnergy for EnergyPool {
    fn energy_stored(&self) -> i32 {
        self.stored_legacy()
    }

    fn max_energy_stored(&self) -> i32 {
        self.capacity_legacy()
    }

    fn can_extract(&self) -> bool {
        EnergyPool::can_extract(self)
    }

    fn can_receive(&self) -> bool {
        EnergyPool::can_receive(self)
    }

    fn receive_energy(&mut self, max_receive: i32, simulate: bool) -> i32 {
        self.receive_legacy(max_receive, simulate)
    }

    fn extract_energy(&mut self, max_extract: i32, simulate: bool) -> i32 {
        self.extract_legacy(max_extract, simulate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<L: LegacyEnergy>(sink: &mut L) -> i32 {
        sink.receive_energy(i32::MAX, false)
    }

    #[test]
    fn narrow_caller_sees_saturated_view() {
        let big = i64::from(i32::MAX) * 3;
        let mut pool = EnergyPool::new(big);
        assert_eq!(LegacyEnergy::max_energy_stored(&pool), i32::MAX);
        assert_eq!(fill(&mut pool), i32::MAX);
        assert_eq!(fill(&mut pool), i32::MAX);
        assert_eq!(pool.stored(), i64::from(i32::MAX) * 2);
        assert_eq!(pool.energy_stored(), i32::MAX);
    }

    #[test]
    fn capability_flags_ignore_fill_level() {
        let empty = EnergyPool::new(10);
        assert!(LegacyEnergy::can_extract(&empty));
        assert!(LegacyEnergy::can_receive(&empty));
    }

    #[test]
    fn simulate_then_commit_agree() {
        let mut pool = EnergyPool::with_rates(100, 100, 7);
        pool.set_stored(50);
        let simulated = pool.extract_energy(20, true);
        assert_eq!(pool.energy_stored(), 50);
        assert_eq!(pool.extract_energy(20, false), simulated);
        assert_eq!(pool.energy_stored(), 43);
    }
}
