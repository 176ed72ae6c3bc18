use fluxcell_common::narrow;

/// A bounded quantity of energy with per-operation transfer ceilings.
///
/// All four fields are tracked at full `i64` width. The legacy protocol reads
/// them through saturating `i32` conversions, so a pool larger than `i32::MAX`
/// stays correct internally and simply looks "full" to narrow callers.
///
/// Fields are private: every mutation goes through an operation that keeps
/// `0 <= stored <= capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyPool {
    stored: i64,
    capacity: i64,
    max_receive: i64,
    max_extract: i64,
}

impl EnergyPool {
    /// Create an empty pool whose receive and extract rates equal its capacity.
    pub fn new(capacity: i64) -> Self {
        Self::with_rates(capacity, capacity, capacity)
    }

    /// Create an empty pool with one shared rate for both directions.
    pub fn with_max_transfer(capacity: i64, max_transfer: i64) -> Self {
        Self::with_rates(capacity, max_transfer, max_transfer)
    }

    /// Create an empty pool with distinct receive and extract rates.
    ///
    /// Construction never fails: capacity is raised to at least `1` and
    /// negative rates are raised to `0`.
    pub fn with_rates(capacity: i64, max_receive: i64, max_extract: i64) -> Self {
        Self {
            stored: 0,
            capacity: capacity.max(1),
            max_receive: max_receive.max(0),
            max_extract: max_extract.max(0),
        }
    }

    pub fn stored(&self) -> i64 {
        self.stored
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn max_receive(&self) -> i64 {
        self.max_receive
    }

    pub fn max_extract(&self) -> i64 {
        self.max_extract
    }

    /// Free space left before the pool is full.
    pub fn headroom(&self) -> i64 {
        self.capacity - self.stored
    }

    // --- Extended protocol ---

    /// Amount a `take(amount, _)` would hand out right now.
    pub fn extractable(&self, amount: i64) -> i64 {
        amount.max(0).min(self.max_extract).min(self.stored)
    }

    /// Amount a `give(amount, _)` would accept right now.
    pub fn receivable(&self, amount: i64) -> i64 {
        amount.max(0).min(self.max_receive).min(self.headroom())
    }

    /// Extract up to `amount`, limited by the stored quantity and the extract
    /// rate. With `simulate` set the result is computed but nothing changes.
    pub fn take(&mut self, amount: i64, simulate: bool) -> i64 {
        let taken = self.extractable(amount);
        if !simulate && taken > 0 {
            self.stored -= taken;
            tracing::trace!(taken, stored = self.stored, "energy extracted");
        }
        taken
    }

    /// Insert up to `amount`, limited by free space and the receive rate.
    /// With `simulate` set the result is computed but nothing changes.
    pub fn give(&mut self, amount: i64, simulate: bool) -> i64 {
        let given = self.receivable(amount);
        if !simulate && given > 0 {
            self.stored += given;
            tracing::trace!(given, stored = self.stored, "energy received");
        }
        given
    }

    // --- Legacy protocol ---

    /// Narrow view of [`stored`](Self::stored).
    pub fn stored_legacy(&self) -> i32 {
        narrow::clamp_quantity(self.stored)
    }

    /// Narrow view of [`capacity`](Self::capacity).
    pub fn capacity_legacy(&self) -> i32 {
        narrow::clamp_quantity(self.capacity)
    }

    pub fn can_extract(&self) -> bool {
        true
    }

    pub fn can_receive(&self) -> bool {
        true
    }

    /// [`give`](Self::give) over the narrow domain.
    pub fn receive_legacy(&mut self, max_amount: i32, simulate: bool) -> i32 {
        narrow::clamp_quantity(self.give(i64::from(max_amount), simulate))
    }

    /// [`take`](Self::take) over the narrow domain.
    pub fn extract_legacy(&mut self, max_amount: i32, simulate: bool) -> i32 {
        narrow::clamp_quantity(self.take(i64::from(max_amount), simulate))
    }

    // --- Mutators ---

    /// Assign the stored quantity, clamped into `[0, capacity]`.
    pub fn set_stored(&mut self, value: i64) {
        self.stored = value.clamp(0, self.capacity);
    }

    /// Shift the stored quantity by `delta`, clamped into `[0, capacity]`.
    pub fn change_stored(&mut self, delta: i64) {
        self.set_stored(self.stored.saturating_add(delta));
    }

    /// Replace the capacity. Ignored when `new_capacity <= 0` or unchanged.
    /// Shrinking below the stored quantity discards the excess.
    pub fn set_capacity(&mut self, new_capacity: i64) {
        if new_capacity <= 0 || new_capacity == self.capacity {
            tracing::debug!(new_capacity, capacity = self.capacity, "capacity change ignored");
            return;
        }
        self.capacity = new_capacity;
        if self.stored > new_capacity {
            self.set_stored(new_capacity);
        }
    }

    /// Set both transfer rates at once. Ignored when `rate < 0`.
    pub fn set_max_transfer(&mut self, rate: i64) {
        if rate < 0 {
            tracing::debug!(rate, "max transfer change ignored");
            return;
        }
        self.max_receive = rate;
        self.max_extract = rate;
    }

    /// Ignored when `rate < 0` or unchanged.
    pub fn set_max_receive(&mut self, rate: i64) {
        if rate < 0 || rate == self.max_receive {
            tracing::debug!(rate, "max receive change ignored");
            return;
        }
        self.max_receive = rate;
    }

    /// Ignored when `rate < 0` or unchanged. Only the extract rate changes.
    pub fn set_max_extract(&mut self, rate: i64) {
        if rate < 0 || rate == self.max_extract {
            tracing::debug!(rate, "max extract change ignored");
            return;
        }
        self.max_extract = rate;
    }

    /// Fold `other` into this pool.
    ///
    /// Stored amount and capacity become the sums of both pools' narrow
    /// views. Rates keep this pool's values. The capacity is widened first so
    /// the combined stored amount is not clipped by the old capacity.
    pub fn merge(&mut self, other: &EnergyPool) {
        let stored = i64::from(self.stored_legacy()) + i64::from(other.stored_legacy());
        let capacity = i64::from(self.capacity_legacy()) + i64::from(other.capacity_legacy());
        self.set_capacity(capacity);
        self.set_stored(stored);
        tracing::debug!(stored = self.stored, capacity = self.capacity, "pools merged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(stored: i64, capacity: i64, max_receive: i64, max_extract: i64) -> EnergyPool {
        let mut p = EnergyPool::with_rates(capacity, max_receive, max_extract);
        p.set_stored(stored);
        p
    }

    #[test]
    fn constructors_default_rates() {
        let p = EnergyPool::new(1000);
        assert_eq!(p.stored(), 0);
        assert_eq!(p.capacity(), 1000);
        assert_eq!(p.max_receive(), 1000);
        assert_eq!(p.max_extract(), 1000);

        let p = EnergyPool::with_max_transfer(1000, 40);
        assert_eq!(p.max_receive(), 40);
        assert_eq!(p.max_extract(), 40);
    }

    #[test]
    fn constructor_repairs_invalid_arguments() {
        let p = EnergyPool::with_rates(0, -3, -4);
        assert_eq!(p.capacity(), 1);
        assert_eq!(p.max_receive(), 0);
        assert_eq!(p.max_extract(), 0);
    }

    #[test]
    fn take_is_clamped_by_extract_rate() {
        let mut p = pool(50, 100, 100, 30);
        assert_eq!(p.take(100, false), 30);
        assert_eq!(p.stored(), 20);
    }

    #[test]
    fn take_is_clamped_by_stored() {
        let mut p = pool(20, 100, 100, 30);
        assert_eq!(p.take(100, false), 20);
        assert_eq!(p.stored(), 0);
    }

    #[test]
    fn give_is_clamped_at_capacity() {
        let mut p = pool(90, 100, 50, 100);
        assert_eq!(p.give(50, false), 10);
        assert_eq!(p.stored(), 100);
    }

    #[test]
    fn non_positive_amounts_transfer_nothing() {
        let mut p = pool(50, 100, 100, 100);
        assert_eq!(p.take(0, false), 0);
        assert_eq!(p.take(-10, false), 0);
        assert_eq!(p.give(-10, false), 0);
        assert_eq!(p.stored(), 50);
    }

    #[test]
    fn simulate_matches_commit_without_mutating() {
        let mut p = pool(50, 100, 25, 30);
        let simulated = p.take(100, true);
        assert_eq!(p.stored(), 50);
        let committed = p.take(100, false);
        assert_eq!(simulated, committed);
        assert_eq!(p.stored(), 20);

        let simulated = p.give(100, true);
        assert_eq!(p.stored(), 20);
        let committed = p.give(100, false);
        assert_eq!(simulated, committed);
        assert_eq!(p.stored(), 45);
    }

    #[test]
    fn legacy_views_saturate() {
        let mut p = EnergyPool::new(i64::from(i32::MAX) * 4);
        p.set_stored(i64::from(i32::MAX) * 3);
        assert_eq!(p.capacity_legacy(), i32::MAX);
        assert_eq!(p.stored_legacy(), i32::MAX);
        assert_eq!(p.capacity(), i64::from(i32::MAX) * 4);
    }

    #[test]
    fn legacy_transfers_share_state() {
        let mut p = pool(50, 100, 100, 100);
        assert_eq!(p.extract_legacy(20, false), 20);
        assert_eq!(p.stored(), 30);
        assert_eq!(p.receive_legacy(5, true), 5);
        assert_eq!(p.stored(), 30);
        assert_eq!(p.receive_legacy(-5, false), 0);
        assert!(p.can_extract());
        assert!(p.can_receive());
    }

    #[test]
    fn legacy_extract_from_huge_pool_stays_in_range() {
        let huge = i64::from(i32::MAX) * 2;
        let mut p = EnergyPool::new(huge);
        p.set_stored(huge);
        assert_eq!(p.extract_legacy(i32::MAX, false), i32::MAX);
        assert_eq!(p.stored(), huge - i64::from(i32::MAX));
    }

    #[test]
    fn set_stored_clamps() {
        let mut p = EnergyPool::new(100);
        p.set_stored(500);
        assert_eq!(p.stored(), 100);
        p.set_stored(-5);
        assert_eq!(p.stored(), 0);
    }

    #[test]
    fn change_stored_clamps_and_saturates() {
        let mut p = EnergyPool::new(100);
        p.change_stored(60);
        p.change_stored(60);
        assert_eq!(p.stored(), 100);
        p.change_stored(i64::MIN);
        assert_eq!(p.stored(), 0);
        p.change_stored(i64::MAX);
        assert_eq!(p.stored(), 100);
    }

    #[test]
    fn shrinking_capacity_reclamps_stored() {
        let mut p = pool(80, 100, 100, 100);
        p.set_capacity(50);
        assert_eq!(p.capacity(), 50);
        assert_eq!(p.stored(), 50);
    }

    #[test]
    fn growing_capacity_keeps_stored() {
        let mut p = pool(80, 100, 100, 100);
        p.set_capacity(500);
        assert_eq!(p.stored(), 80);
    }

    #[test]
    fn invalid_capacity_is_ignored() {
        let mut p = pool(80, 100, 100, 100);
        p.set_capacity(0);
        p.set_capacity(-20);
        assert_eq!(p.capacity(), 100);
        assert_eq!(p.stored(), 80);
    }

    #[test]
    fn negative_rates_are_ignored() {
        let mut p = EnergyPool::with_rates(100, 10, 20);
        p.set_max_receive(-1);
        p.set_max_extract(-1);
        p.set_max_transfer(-1);
        assert_eq!(p.max_receive(), 10);
        assert_eq!(p.max_extract(), 20);
    }

    #[test]
    fn set_max_transfer_sets_both() {
        let mut p = EnergyPool::with_rates(100, 10, 20);
        p.set_max_transfer(0);
        assert_eq!(p.max_receive(), 0);
        assert_eq!(p.max_extract(), 0);
    }

    #[test]
    fn set_max_extract_leaves_receive_rate_alone() {
        let mut p = EnergyPool::with_rates(100, 10, 20);
        p.set_max_extract(7);
        assert_eq!(p.max_extract(), 7);
        assert_eq!(p.max_receive(), 10);

        p.set_max_receive(3);
        assert_eq!(p.max_receive(), 3);
        assert_eq!(p.max_extract(), 7);
    }

    #[test]
    fn merge_sums_stored_and_capacity() {
        let mut a = EnergyPool::with_rates(100, 11, 12);
        a.set_stored(10);
        let mut b = EnergyPool::with_rates(50, 99, 99);
        b.set_stored(5);

        a.merge(&b);
        assert_eq!(a.stored(), 15);
        assert_eq!(a.capacity(), 150);
        assert_eq!(a.max_receive(), 11);
        assert_eq!(a.max_extract(), 12);
    }

    #[test]
    fn merge_keeps_energy_of_full_pools() {
        let mut a = pool(100, 100, 1, 1);
        let b = pool(50, 50, 1, 1);
        a.merge(&b);
        assert_eq!(a.stored(), 150);
        assert_eq!(a.capacity(), 150);
    }

    #[test]
    fn merge_uses_narrow_views() {
        let huge = i64::from(i32::MAX) + 1000;
        let mut a = EnergyPool::new(huge);
        a.set_stored(huge);
        let b = pool(10, 20, 1, 1);
        a.merge(&b);
        assert_eq!(a.capacity(), i64::from(i32::MAX) + 20);
        assert_eq!(a.stored(), i64::from(i32::MAX) + 10);
    }
}
