//! Shared types for fluxcell: the compound record format and narrow-integer helpers.

pub mod narrow;
mod types;

pub use narrow::NARROW_MAX;
pub use types::{Record, Tag};
