// crates/points-economics/src/oracle.rs
//
// Fixed-point exchange rates between points and external assets.
//
// A rate is a u128 scaled by 10^18 (1.0 == FIXED_POINT_SCALE) giving target
// asset base units per point. Conversions widen to u128, check every
// intermediate step for overflow, and round by adding a bias of
// (denominator - 1) / 2 before the truncating division:
//
//   asset = (points * rate + (10^18 - 1) / 2) / 10^18
//
// Remainders strictly above one half round up; an exact half rounds down,
// so 3 points at a rate of 1.5 convert to 4.
//
// Conversion functions never look at staleness. The `quote_*` methods on
// `RateOracle` are the checked call-sites; anything else converting with a
// raw rate must call `is_stale` itself.

use serde::{Deserialize, Serialize};

use points_core::{
    CapabilityId, Epoch, EventSink, OracleCap, OracleId, PointsError, PointsEvent,
};

use crate::units::{FIXED_POINT_SCALE, MAX_TARGET_DECIMALS};

/// Bias added before dividing by `FIXED_POINT_SCALE`.
pub const ROUNDING_BIAS: u128 = rounding_bias(FIXED_POINT_SCALE);

const fn rounding_bias(denominator: u128) -> u128 {
    (denominator - 1) / 2
}

fn validate_conversion(rate: u128, target_decimals: u8) -> Result<(), PointsError> {
    if target_decimals > MAX_TARGET_DECIMALS {
        return Err(PointsError::InvalidDecimals(target_decimals));
    }
    if rate == 0 {
        return Err(PointsError::InvalidRate);
    }
    Ok(())
}

/// Convert `points` into target asset base units at `rate`.
///
/// Performs no staleness check.
///
/// # Errors
/// - `InvalidDecimals` if `target_decimals > 18`.
/// - `InvalidRate` if `rate` is zero.
/// - `ConversionOverflow` if the widened product overflows u128 or the
///   result does not fit in u64.
pub fn convert_points_to_asset(points: u64, rate: u128, target_decimals: u8) -> Result<u64, PointsError> {
    validate_conversion(rate, target_decimals)?;
    let product = (points as u128)
        .checked_mul(rate)
        .ok_or(PointsError::ConversionOverflow)?;
    let biased = product
        .checked_add(ROUNDING_BIAS)
        .ok_or(PointsError::ConversionOverflow)?;
    u64::try_from(biased / FIXED_POINT_SCALE).map_err(|_| PointsError::ConversionOverflow)
}

/// Convert `asset_amount` target base units into points at `rate`; the
/// inverse of [`convert_points_to_asset`] with the same rounding policy.
///
/// Performs no staleness check.
pub fn convert_asset_to_points(
    asset_amount: u64,
    rate: u128,
    target_decimals: u8,
) -> Result<u64, PointsError> {
    validate_conversion(rate, target_decimals)?;
    let product = (asset_amount as u128)
        .checked_mul(FIXED_POINT_SCALE)
        .ok_or(PointsError::ConversionOverflow)?;
    let biased = product
        .checked_add(rounding_bias(rate))
        .ok_or(PointsError::ConversionOverflow)?;
    u64::try_from(biased / rate).map_err(|_| PointsError::ConversionOverflow)
}

/// Exchange rate for one external denomination.
///
/// Bound to the oracle capability that created it; only that capability can
/// change the rate or the staleness threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOracle {
    id: OracleId,
    authority: CapabilityId,
    symbol: String,
    base_rate: u128,
    decimals: u8,
    last_update_epoch: Epoch,
    staleness_threshold_epochs: u64,
}

impl RateOracle {
    /// Create an oracle with an initial rate, fresh as of `now_epoch`.
    ///
    /// # Errors
    /// `InvalidRate`, `InvalidDecimals`, or `InvalidStalenessThreshold` on
    /// out-of-range input.
    pub fn create(
        cap: &OracleCap,
        symbol: impl Into<String>,
        initial_rate: u128,
        decimals: u8,
        staleness_threshold_epochs: u64,
        now_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<Self, PointsError> {
        if initial_rate == 0 {
            return Err(PointsError::InvalidRate);
        }
        if decimals > MAX_TARGET_DECIMALS {
            return Err(PointsError::InvalidDecimals(decimals));
        }
        if staleness_threshold_epochs == 0 {
            return Err(PointsError::InvalidStalenessThreshold);
        }

        let oracle = Self {
            id: OracleId::generate(),
            authority: cap.id(),
            symbol: symbol.into(),
            base_rate: initial_rate,
            decimals,
            last_update_epoch: now_epoch,
            staleness_threshold_epochs,
        };

        tracing::info!(oracle_id = %oracle.id, symbol = %oracle.symbol, rate = initial_rate, "Rate oracle created");
        sink.emit(PointsEvent::OracleCreated {
            oracle_id: oracle.id,
            symbol: oracle.symbol.clone(),
            rate: initial_rate,
            decimals,
            staleness_threshold: staleness_threshold_epochs,
            epoch: now_epoch,
        });
        Ok(oracle)
    }

    fn authorize(&self, cap: &OracleCap) -> Result<(), PointsError> {
        cap.authorize(self.authority).inspect_err(|_| {
            tracing::warn!(oracle_id = %self.id, "Rejected oracle update with foreign capability");
        })
    }

    /// Publish a new rate observed at `now_epoch`.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidRate`.
    /// - `EpochInPast` if `now_epoch` precedes the previous update.
    pub fn update_rate(
        &mut self,
        cap: &OracleCap,
        new_rate: u128,
        now_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.authorize(cap)?;
        if new_rate == 0 {
            return Err(PointsError::InvalidRate);
        }
        if now_epoch < self.last_update_epoch {
            return Err(PointsError::EpochInPast {
                epoch: now_epoch,
                earliest: self.last_update_epoch,
            });
        }
        let old_rate = self.base_rate;
        self.base_rate = new_rate;
        self.last_update_epoch = now_epoch;

        tracing::debug!(oracle_id = %self.id, old_rate, new_rate, now_epoch, "Rate updated");
        sink.emit(PointsEvent::RateUpdated {
            oracle_id: self.id,
            old_rate,
            new_rate,
            epoch: now_epoch,
        });
        Ok(())
    }

    pub fn update_staleness_threshold(
        &mut self,
        cap: &OracleCap,
        new_threshold: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.authorize(cap)?;
        if new_threshold == 0 {
            return Err(PointsError::InvalidStalenessThreshold);
        }
        let old_threshold = self.staleness_threshold_epochs;
        self.staleness_threshold_epochs = new_threshold;

        sink.emit(PointsEvent::StalenessThresholdUpdated {
            oracle_id: self.id,
            old_threshold,
            new_threshold,
        });
        Ok(())
    }

    /// True once more than `staleness_threshold` epochs have passed since the
    /// last update.
    pub fn is_stale(&self, now_epoch: Epoch) -> bool {
        now_epoch > self.last_update_epoch
            && now_epoch - self.last_update_epoch > self.staleness_threshold_epochs
    }

    fn ensure_fresh(&self, now_epoch: Epoch) -> Result<(), PointsError> {
        if self.is_stale(now_epoch) {
            return Err(PointsError::StaleRate {
                last_update_epoch: self.last_update_epoch,
                current_epoch: now_epoch,
                threshold: self.staleness_threshold_epochs,
            });
        }
        Ok(())
    }

    /// Staleness-checked [`convert_points_to_asset`] at this oracle's rate.
    pub fn quote_points_to_asset(&self, points: u64, now_epoch: Epoch) -> Result<u64, PointsError> {
        self.ensure_fresh(now_epoch)?;
        convert_points_to_asset(points, self.base_rate, self.decimals)
    }

    /// Staleness-checked [`convert_asset_to_points`] at this oracle's rate.
    pub fn quote_asset_to_points(&self, asset_amount: u64, now_epoch: Epoch) -> Result<u64, PointsError> {
        self.ensure_fresh(now_epoch)?;
        convert_asset_to_points(asset_amount, self.base_rate, self.decimals)
    }

    pub fn id(&self) -> OracleId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rate(&self) -> u128 {
        self.base_rate
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn last_update_epoch(&self) -> Epoch {
        self.last_update_epoch
    }

    pub fn staleness_threshold(&self) -> u64 {
        self.staleness_threshold_epochs
    }
}
