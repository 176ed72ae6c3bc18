//! Energy storage: a bounded pool served over two transfer protocols.
//!
//! # Invariants
//! - `0 <= stored <= capacity` after every public operation.
//! - `capacity > 0`, `max_receive >= 0`, `max_extract >= 0`.
//! - No pool operation fails. Out-of-range input is clamped, invalid
//!   configuration requests are ignored.
//! - The narrow (`i32`) protocol is a projection computed on demand; the pool
//!   holds exactly one copy of its state.

mod config;
mod error;
mod pool;
pub mod protocol;
mod record;

pub use config::PoolConfig;
pub use error::ConfigError;
pub use pool::EnergyPool;
pub use record::{ENERGY_KEY, RecordSerializable, STORAGE_KEY};

#[cfg(feature = "extended")]
pub use protocol::ExtendedEnergy;
#[cfg(feature = "legacy")]
pub use protocol::LegacyEnergy;
