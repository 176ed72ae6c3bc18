//! Conversions between the wide (`i64`) and narrow (`i32`) energy domains.

/// Largest value the narrow protocol can represent.
pub const NARROW_MAX: i64 = i32::MAX as i64;

/// Saturate a wide value into the narrow range.
pub fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), NARROW_MAX) as i32
}

/// Clamp a wide value to `[0, NARROW_MAX]`. Used for quantities that are
/// never negative (stored amounts, capacities, transfer results).
pub fn clamp_quantity(value: i64) -> i32 {
    value.clamp(0, NARROW_MAX) as i32
}
