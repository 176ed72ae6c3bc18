use crate::pool::EnergyPool;

/// Wide (`i64`) energy protocol.
pub trait ExtendedEnergy {
    fn stored_power(&self) -> i64;
    fn capacity_power(&self) -> i64;
    /// Extract up to `power`; returns the amount extracted (or that would be).
    fn take_power(&mut self, power: i64, simulate: bool) -> i64;
    /// Insert up to `power`; returns the amount accepted (or that would be).
    fn give_power(&mut self, power: i64, simulate: bool) -> i64;
}

impl ExtendedEnergy for EnergyPool {
    fn stored_power(&self) -> i64 {
        self.stored()
    }

    fn capacity_power(&self) -> i64 {
        self.capacity()
    }

    fn take_power(&mut self, power: i64, simulate: bool) -> i64 {
        self.take(power, simulate)
    }

    fn give_power(&mut self, power: i64, simulate: bool) -> i64 {
        self.give(power, simulate)
    }
}
