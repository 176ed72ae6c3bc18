//! External transfer protocols served by [`EnergyPool`](crate::EnergyPool).
//!
//! Each protocol is a trait so collaborators can be generic over whichever
//! API they speak. Both impls delegate to the pool's inherent methods; the
//! pool keeps a single copy of its state. Cargo features select which
//! protocols a build exposes.

#[cfg(feature = "extended")]
mod extended;
#[cfg(feature = "legacy")]
mod legacy;

#[cfg(feature = "extended")]
pub use extended::ExtendedEnergy;
#[cfg(feature = "legacy")]
pub use legacy::LegacyEnergy;
