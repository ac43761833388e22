// crates/points-economics/src/policy.rs
//
// Economic policy parameters.
//
// Defaults:
//   - Per-account mint cap: 1,000,000 points per epoch
//   - Loan-to-value: 70% (7,000 bps)
//   - Loan interest: 5% per year (500 bps), 365 epochs per year
//   - Protocol principal rate: 1 point per principal unit
//   - Maximum stake duration: 3,650 epochs
//
// Loaded as the `[policy]` table of the daemon configuration; every field
// falls back to its default when omitted.

use serde::{Deserialize, Serialize};

use points_core::PointsError;

use crate::units::BPS_DENOMINATOR;

/// Default per-account, per-epoch issuance cap (points).
pub const DEFAULT_EPOCH_MINT_CAP: u64 = 1_000_000;

/// Default loan-to-value ratio: 70%.
pub const DEFAULT_LTV_BPS: u64 = 7_000;

/// Default simple annual interest on loans: 5%.
pub const DEFAULT_ANNUAL_INTEREST_BPS: u64 = 500;

/// Default number of epochs in a year (one epoch per day).
pub const DEFAULT_EPOCHS_PER_YEAR: u64 = 365;

/// Default points credited per unit of staked principal when sizing loans.
pub const DEFAULT_POINTS_PER_PRINCIPAL_UNIT: u64 = 1;

/// Maximum stake lock duration (ten years of daily epochs).
pub const MAX_STAKE_DURATION_EPOCHS: u64 = 3_650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Points that may be minted to one account within one epoch.
    #[serde(default = "default_epoch_mint_cap")]
    pub epoch_mint_cap: u64,

    /// Loan-to-value ratio in basis points.
    #[serde(default = "default_ltv_bps")]
    pub ltv_bps: u64,

    /// Simple annual interest rate on loans, in basis points.
    #[serde(default = "default_annual_interest_bps")]
    pub annual_interest_bps: u64,

    #[serde(default = "default_epochs_per_year")]
    pub epochs_per_year: u64,

    /// Fixed protocol rate converting stake principal into points for LTV
    /// sizing. Independent of any rate oracle.
    #[serde(default = "default_points_per_principal_unit")]
    pub points_per_principal_unit: u64,

    #[serde(default = "default_max_stake_duration_epochs")]
    pub max_stake_duration_epochs: u64,
}

fn default_epoch_mint_cap() -> u64 {
    DEFAULT_EPOCH_MINT_CAP
}

fn default_ltv_bps() -> u64 {
    DEFAULT_LTV_BPS
}

fn default_annual_interest_bps() -> u64 {
    DEFAULT_ANNUAL_INTEREST_BPS
}

fn default_epochs_per_year() -> u64 {
    DEFAULT_EPOCHS_PER_YEAR
}

fn default_points_per_principal_unit() -> u64 {
    DEFAULT_POINTS_PER_PRINCIPAL_UNIT
}

fn default_max_stake_duration_epochs() -> u64 {
    MAX_STAKE_DURATION_EPOCHS
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            epoch_mint_cap: default_epoch_mint_cap(),
            ltv_bps: default_ltv_bps(),
            annual_interest_bps: default_annual_interest_bps(),
            epochs_per_year: default_epochs_per_year(),
            points_per_principal_unit: default_points_per_principal_unit(),
            max_stake_duration_epochs: default_max_stake_duration_epochs(),
        }
    }
}

impl PolicyConfig {
    /// Reject parameter combinations the economy cannot run with.
    ///
    /// # Errors
    /// Returns `PointsError::Config` describing the first offending field.
    pub fn validate(&self) -> Result<(), PointsError> {
        if self.epoch_mint_cap == 0 {
            return Err(PointsError::Config(
                "epoch_mint_cap must be greater than zero".to_string(),
            ));
        }
        if self.ltv_bps == 0 || self.ltv_bps > BPS_DENOMINATOR {
            return Err(PointsError::Config(format!(
                "ltv_bps must be in 1..={}, got {}",
                BPS_DENOMINATOR, self.ltv_bps
            )));
        }
        if self.epochs_per_year == 0 {
            return Err(PointsError::Config(
                "epochs_per_year must be greater than zero".to_string(),
            ));
        }
        if self.points_per_principal_unit == 0 {
            return Err(PointsError::Config(
                "points_per_principal_unit must be greater than zero".to_string(),
            ));
        }
        if self.max_stake_duration_epochs == 0 {
            return Err(PointsError::Config(
                "max_stake_duration_epochs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = PolicyConfig::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.ltv_bps, 7_000);
        assert_eq!(policy.max_stake_duration_epochs, 3_650);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let policy: PolicyConfig = serde_json::from_str(r#"{"ltv_bps": 5000}"#).unwrap();
        assert_eq!(policy.ltv_bps, 5_000);
        assert_eq!(policy.epoch_mint_cap, DEFAULT_EPOCH_MINT_CAP);
        assert_eq!(policy.epochs_per_year, DEFAULT_EPOCHS_PER_YEAR);
    }

    #[test]
    fn test_ltv_above_100_percent_rejected() {
        let policy = PolicyConfig {
            ltv_bps: BPS_DENOMINATOR + 1,
            ..PolicyConfig::default()
        };
        assert!(matches!(policy.validate(), Err(PointsError::Config(_))));
    }

    #[test]
    fn test_zero_epochs_per_year_rejected() {
        let policy = PolicyConfig {
            epochs_per_year: 0,
            ..PolicyConfig::default()
        };
        assert!(policy.validate().is_err());
    }
}
