// crates/points-core/src/error.rs
//
// Error taxonomy for the points economy.
//
// Every failing operation aborts before any state change, so an error is
// always a complete description of why nothing happened.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Epoch;

/// Protocol-wide error types for the points economy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointsError {
    /// Capability missing or bound to a different authority, or the caller
    /// does not own the target object.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Zero amount where a positive amount is required.
    #[error("Invalid amount: amounts must be greater than zero")]
    InvalidAmount,

    /// Stake principal of zero.
    #[error("Invalid principal: stake principal must be greater than zero")]
    InvalidPrincipal,

    /// Stake duration is zero, above the configured maximum, or overflows the epoch counter.
    #[error("Invalid duration: {duration} epochs (allowed 1..={max})")]
    InvalidDuration { duration: u64, max: u64 },

    /// Zero exchange rate.
    #[error("Invalid rate: exchange rate must be greater than zero")]
    InvalidRate,

    /// Target asset decimals above 18.
    #[error("Invalid decimals: {0} (maximum is 18)")]
    InvalidDecimals(u8),

    /// Zero staleness threshold.
    #[error("Invalid staleness threshold: must be greater than zero")]
    InvalidStalenessThreshold,

    /// Malformed account address.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Insufficient locked balance: requested {requested}, locked {locked}")]
    InsufficientLockedBalance { requested: u64, locked: u64 },

    /// The stake already backs an open loan.
    #[error("Stake is already encumbered")]
    AlreadyEncumbered,

    /// The stake does not back an open loan.
    #[error("Stake is not encumbered")]
    NotEncumbered,

    /// Redemption attempted while the stake backs an open loan.
    #[error("Stake is encumbered by an open loan and cannot be redeemed")]
    StakeEncumbered,

    #[error("Stake is not mature: unlocks at epoch {unlock_epoch}, current epoch {current_epoch}")]
    StakeNotMature {
        unlock_epoch: Epoch,
        current_epoch: Epoch,
    },

    /// Repayment named a stake other than the loan's collateral.
    #[error("Collateral mismatch: loan is backed by a different stake")]
    CollateralMismatch,

    #[error("Exceeds max LTV: requested {requested} points, maximum {max_loan}")]
    ExceedsMaxLtv { requested: u64, max_loan: u64 },

    #[error("Daily cap exceeded: minted {minted} + {requested} exceeds cap {cap} in epoch {epoch}")]
    DailyCapExceeded {
        epoch: Epoch,
        minted: u64,
        requested: u64,
        cap: u64,
    },

    /// An epoch earlier than the economy permits: behind the clock, before
    /// a loan was opened, or inside a window whose mint counters were pruned.
    #[error("Epoch {epoch} is in the past (earliest permitted {earliest})")]
    EpochInPast { epoch: Epoch, earliest: Epoch },

    /// Fixed-point conversion result not representable.
    #[error("Conversion overflow")]
    ConversionOverflow,

    /// Supply, balance, or interest arithmetic left the representable range.
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("Stale rate: last update at epoch {last_update_epoch}, current epoch {current_epoch}, threshold {threshold}")]
    StaleRate {
        last_update_epoch: Epoch,
        current_epoch: Epoch,
        threshold: u64,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of [`PointsError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Authorization,
    Validation,
    InsufficientResource,
    StateConflict,
    Arithmetic,
    Staleness,
    NotFound,
    Config,
}

impl PointsError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PointsError::Unauthorized(_) => ErrorKind::Authorization,
            PointsError::InvalidAmount
            | PointsError::InvalidPrincipal
            | PointsError::InvalidDuration { .. }
            | PointsError::InvalidRate
            | PointsError::InvalidDecimals(_)
            | PointsError::InvalidStalenessThreshold
            | PointsError::InvalidAccount(_) => ErrorKind::Validation,
            PointsError::InsufficientBalance { .. }
            | PointsError::InsufficientLockedBalance { .. } => ErrorKind::InsufficientResource,
            PointsError::AlreadyEncumbered
            | PointsError::NotEncumbered
            | PointsError::StakeEncumbered
            | PointsError::StakeNotMature { .. }
            | PointsError::CollateralMismatch
            | PointsError::ExceedsMaxLtv { .. }
            | PointsError::DailyCapExceeded { .. }
            | PointsError::EpochInPast { .. } => ErrorKind::StateConflict,
            PointsError::ConversionOverflow | PointsError::ArithmeticOverflow(_) => {
                ErrorKind::Arithmetic
            }
            PointsError::StaleRate { .. } => ErrorKind::Staleness,
            PointsError::NotFound(_) => ErrorKind::NotFound,
            PointsError::Config(_) => ErrorKind::Config,
        }
    }
}
