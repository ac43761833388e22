// crates/points-economics/src/units.rs
//
// Denominations and fixed-point constants.
//
// Points are whole integers (no sub-point unit). Ratios are expressed in
// basis points, exchange rates as u128 values scaled by 10^18. All
// intermediate products are widened to u128 and every division truncates.

/// Basis-point denominator: 10,000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Scale of fixed-point exchange rates: 1.0 == 10^18.
pub const FIXED_POINT_SCALE: u128 = 1_000_000_000_000_000_000;

/// Maximum decimals of a target asset.
pub const MAX_TARGET_DECIMALS: u8 = 18;

/// Apply a basis-point ratio to `amount`, rounding toward zero.
///
/// The product is computed in u128. Ratios above 100% saturate at `u64::MAX`.
pub fn apply_bps(amount: u64, bps: u64) -> u64 {
    let scaled = amount as u128 * bps as u128 / BPS_DENOMINATOR as u128;
    scaled.min(u64::MAX as u128) as u64
}

/// Express `whole` units as a fixed-point rate.
pub fn fixed_point(whole: u64) -> u128 {
    whole as u128 * FIXED_POINT_SCALE
}
