// crates/points-economics/src/lib.rs
//
// points-economics: point ledger, stake positions, collateralized loans,
// and fixed-point rate oracles.
//
// Points are whole u64 amounts. Time is an explicit epoch argument on every
// time-sensitive call; nothing here reads a clock. All types are plain
// synchronous state machines. Hosts that need concurrent access serialize
// calls on a `PointsEconomy` (see points-daemon).

pub mod economy;
pub mod ledger;
pub mod lending;
pub mod oracle;
pub mod policy;
pub mod staking;
pub mod units;

// Re-export key types for ergonomic access from downstream crates.
pub use economy::PointsEconomy;
pub use ledger::Ledger;
pub use lending::{simple_interest, Loan, LoanManager, LoanStatement, LoanTerms};
pub use oracle::{convert_asset_to_points, convert_points_to_asset, RateOracle, ROUNDING_BIAS};
pub use policy::{PolicyConfig, MAX_STAKE_DURATION_EPOCHS};
pub use staking::{StakePosition, StakeRegistry};
pub use units::{apply_bps, fixed_point, BPS_DENOMINATOR, FIXED_POINT_SCALE, MAX_TARGET_DECIMALS};
