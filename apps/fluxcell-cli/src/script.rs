//! Transfer scripts: `give:N`, `take:N`, `recv32:N`, `extr32:N`, `sim-give:N`, `sim-take:N`.

use std::fmt;
use std::str::FromStr;

use fluxcell_storage::EnergyPool;

/// One transfer applied to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Give { amount: i64, simulate: bool },
    Take { amount: i64, simulate: bool },
    ReceiveLegacy(i32),
    ExtractLegacy(i32),
}

impl Step {
    /// Apply the step and return the amount moved.
    pub fn apply(self, pool: &mut EnergyPool) -> i64 {
        match self {
            Step::Give { amount, simulate } => pool.give(amount, simulate),
            Step::Take { amount, simulate } => pool.take(amount, simulate),
            Step::ReceiveLegacy(amount) => i64::from(pool.receive_legacy(amount, false)),
            Step::ExtractLegacy(amount) => i64::from(pool.extract_legacy(amount, false)),
        }
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, amount) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <op>:<amount>, got {s:?}"))?;
        let wide = || {
            amount
                .parse::<i64>()
                .map_err(|e| format!("bad amount {amount:?}: {e}"))
        };
        let narrow = || {
            amount
                .parse::<i32>()
                .map_err(|e| format!("bad 32-bit amount {amount:?}: {e}"))
        };
        match op {
            "give" => Ok(Step::Give { amount: wide()?, simulate: false }),
            "take" => Ok(Step::Take { amount: wide()?, simulate: false }),
            "sim-give" => Ok(Step::Give { amount: wide()?, simulate: true }),
            "sim-take" => Ok(Step::Take { amount: wide()?, simulate: true }),
            "recv32" => Ok(Step::ReceiveLegacy(narrow()?)),
            "extr32" => Ok(Step::ExtractLegacy(narrow()?)),
            other => Err(format!("unknown op {other:?}")),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Give { amount, simulate: false } => write!(f, "give:{amount}"),
            Step::Give { amount, simulate: true } => write!(f, "sim-give:{amount}"),
            Step::Take { amount, simulate: false } => write!(f, "take:{amount}"),
            Step::Take { amount, simulate: true } => write!(f, "sim-take:{amount}"),
            Step::ReceiveLegacy(amount) => write!(f, "recv32:{amount}"),
            Step::ExtractLegacy(amount) => write!(f, "extr32:{amount}"),
        }
    }
}

/// A pool written as `stored/capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSpec {
    pub stored: i64,
    pub capacity: i64,
}

impl PoolSpec {
    pub fn build(self) -> EnergyPool {
        let mut pool = EnergyPool::new(self.capacity);
        pool.set_stored(self.stored);
        pool
    }
}

impl FromStr for PoolSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stored, capacity) = s
            .split_once('/')
            .ok_or_else(|| format!("expected <stored>/<capacity>, got {s:?}"))?;
        Ok(Self {
            stored: stored.parse().map_err(|e| format!("bad stored {stored:?}: {e}"))?,
            capacity: capacity
                .parse()
                .map_err(|e| format!("bad capacity {capacity:?}: {e}"))?,
        })
    }
}
