// crates/points-core/src/events.rs
//
// Structured events emitted synchronously with every successful mutation.
//
// Events are the only observability channel of the economy. Each ledger
// event carries the resulting balances so an indexer can rebuild balance
// history without replaying arithmetic.

use serde::{Deserialize, Serialize};

use crate::identity::{AccountId, ChainId, Epoch, LoanId, OracleId, StakeId};

/// Why points were minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EarnSource {
    /// Governance-issued reward.
    Reward,
    /// Principal of a collateralized loan.
    Loan { loan_id: LoanId },
}

/// Why points were burned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpendSource {
    /// Governance-initiated spend.
    Spend,
    /// Principal plus interest returned to close a loan.
    LoanRepayment { loan_id: LoanId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointsEvent {
    Earned {
        account: AccountId,
        amount: u64,
        epoch: Epoch,
        source: EarnSource,
        new_available: u64,
    },
    Spent {
        account: AccountId,
        amount: u64,
        source: SpendSource,
        new_available: u64,
    },
    Locked {
        account: AccountId,
        amount: u64,
        new_available: u64,
        new_locked: u64,
    },
    Unlocked {
        account: AccountId,
        amount: u64,
        new_available: u64,
        new_locked: u64,
    },
    EpochMintCapUpdated {
        old_cap: u64,
        new_cap: u64,
    },
    EpochAdvanced {
        previous: Epoch,
        current: Epoch,
    },
    StakeCreated {
        stake_id: StakeId,
        owner: AccountId,
        chain_id: ChainId,
        amount: u64,
        duration: u64,
        start_epoch: Epoch,
        unlock_epoch: Epoch,
    },
    StakeEncumbered {
        stake_id: StakeId,
        encumbered: bool,
    },
    StakeDestroyed {
        stake_id: StakeId,
        owner: AccountId,
    },
    LoanOpened {
        loan_id: LoanId,
        borrower: AccountId,
        stake_id: StakeId,
        principal_points: u64,
        opened_epoch: Epoch,
    },
    LoanRepaid {
        loan_id: LoanId,
        borrower: AccountId,
        stake_id: StakeId,
        principal_points: u64,
        interest_points: u64,
        repaid_epoch: Epoch,
    },
    OracleCreated {
        oracle_id: OracleId,
        symbol: String,
        rate: u128,
        decimals: u8,
        staleness_threshold: u64,
        epoch: Epoch,
    },
    RateUpdated {
        oracle_id: OracleId,
        old_rate: u128,
        new_rate: u128,
        epoch: Epoch,
    },
    StalenessThresholdUpdated {
        oracle_id: OracleId,
        old_threshold: u64,
        new_threshold: u64,
    },
}

impl PointsEvent {
    /// Short name of the event variant, for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            PointsEvent::Earned { .. } => "Earned",
            PointsEvent::Spent { .. } => "Spent",
            PointsEvent::Locked { .. } => "Locked",
            PointsEvent::Unlocked { .. } => "Unlocked",
            PointsEvent::EpochMintCapUpdated { .. } => "EpochMintCapUpdated",
            PointsEvent::EpochAdvanced { .. } => "EpochAdvanced",
            PointsEvent::StakeCreated { .. } => "StakeCreated",
            PointsEvent::StakeEncumbered { .. } => "StakeEncumbered",
            PointsEvent::StakeDestroyed { .. } => "StakeDestroyed",
            PointsEvent::LoanOpened { .. } => "LoanOpened",
            PointsEvent::LoanRepaid { .. } => "LoanRepaid",
            PointsEvent::OracleCreated { .. } => "OracleCreated",
            PointsEvent::RateUpdated { .. } => "RateUpdated",
            PointsEvent::StalenessThresholdUpdated { .. } => "StalenessThresholdUpdated",
        }
    }
}
