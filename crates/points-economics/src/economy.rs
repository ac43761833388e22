// crates/points-economics/src/economy.rs
//
// PointsEconomy: one ledger, the stake registry, the loan manager, and the
// rate oracles behind a single `&mut self`.
//
// Multi-entity operations (opening and repaying loans) run against a single
// exclusive borrow. Hosts serialize access to this struct.
//
// The economy owns the epoch clock. Governance advances it monotonically with
// `advance_epoch`; every operation reads the current epoch from the clock, so
// no caller can backdate a repayment or fast-forward a stake to maturity.

use std::collections::HashMap;

use points_core::{
    AccountId, ChainId, Epoch, EventSink, GovernanceCap, LoanId, OracleCap, OracleId,
    PointsError, PointsEvent, StakeId,
};

use crate::ledger::Ledger;
use crate::lending::{Loan, LoanManager, LoanStatement, LoanTerms};
use crate::oracle::RateOracle;
use crate::policy::PolicyConfig;
use crate::staking::{StakePosition, StakeRegistry};

#[derive(Debug)]
pub struct PointsEconomy {
    policy: PolicyConfig,
    current_epoch: Epoch,
    ledger: Ledger,
    stakes: StakeRegistry,
    loans: LoanManager,
    oracles: HashMap<OracleId, RateOracle>,
}

impl PointsEconomy {
    /// Build an empty economy at epoch 0 whose ledger is governed by
    /// `governance`.
    ///
    /// # Errors
    /// `PointsError::Config` if `policy` fails validation.
    pub fn new(governance: &GovernanceCap, policy: PolicyConfig) -> Result<Self, PointsError> {
        policy.validate()?;
        Ok(Self {
            current_epoch: 0,
            ledger: Ledger::new(governance, policy.epoch_mint_cap),
            stakes: StakeRegistry::new(policy.max_stake_duration_epochs),
            loans: LoanManager::new(LoanTerms::from(&policy)),
            oracles: HashMap::new(),
            policy,
        })
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stakes(&self) -> &StakeRegistry {
        &self.stakes
    }

    pub fn loans(&self) -> &LoanManager {
        &self.loans
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    /// Move the clock forward to `epoch`. Advancing to the current epoch is
    /// a no-op.
    ///
    /// # Errors
    /// - `Unauthorized` if `cap` is not the ledger's governance capability.
    /// - `EpochInPast` if `epoch` is behind the clock.
    pub fn advance_epoch(
        &mut self,
        cap: &GovernanceCap,
        epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        cap.authorize(self.ledger.governance())?;
        if epoch < self.current_epoch {
            return Err(PointsError::EpochInPast {
                epoch,
                earliest: self.current_epoch,
            });
        }
        if epoch == self.current_epoch {
            return Ok(());
        }
        let previous = self.current_epoch;
        self.current_epoch = epoch;
        tracing::info!(previous, current = epoch, "Epoch advanced");
        sink.emit(PointsEvent::EpochAdvanced {
            previous,
            current: epoch,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Ledger
    // ---------------------------------------------------------------------

    /// Mint a reward into the current epoch.
    pub fn earn(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        self.ledger
            .earn(cap, account, amount, self.current_epoch, sink)
    }

    pub fn spend(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        self.ledger.spend(cap, account, amount, sink)
    }

    pub fn lock(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.ledger.lock(cap, account, amount, sink)
    }

    pub fn unlock(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.ledger.unlock(cap, account, amount, sink)
    }

    pub fn set_epoch_mint_cap(
        &mut self,
        cap: &GovernanceCap,
        new_cap: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.ledger.set_epoch_mint_cap(cap, new_cap, sink)?;
        self.policy.epoch_mint_cap = new_cap;
        Ok(())
    }

    /// Drop mint counters of every epoch before the current one.
    pub fn prune_mint_stats(&mut self, cap: &GovernanceCap) -> Result<usize, PointsError> {
        self.ledger.prune_mint_stats(cap, self.current_epoch)
    }

    pub fn available_balance(&self, account: &AccountId) -> u64 {
        self.ledger.available_balance(account)
    }

    pub fn locked_balance(&self, account: &AccountId) -> u64 {
        self.ledger.locked_balance(account)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    // ---------------------------------------------------------------------
    // Staking
    // ---------------------------------------------------------------------

    /// Open a stake starting at the current epoch.
    pub fn create_stake(
        &mut self,
        owner: AccountId,
        chain_id: ChainId,
        principal: u64,
        duration_epochs: u64,
        sink: &mut dyn EventSink,
    ) -> Result<StakeId, PointsError> {
        self.stakes.create(
            owner,
            chain_id,
            principal,
            duration_epochs,
            self.current_epoch,
            sink,
        )
    }

    /// Destroy a mature, unencumbered stake and hand back its principal.
    pub fn redeem_stake(
        &mut self,
        owner: &AccountId,
        stake_id: StakeId,
        sink: &mut dyn EventSink,
    ) -> Result<StakePosition, PointsError> {
        self.stakes
            .redeem(owner, stake_id, self.current_epoch, sink)
    }

    pub fn stake(&self, stake_id: &StakeId) -> Result<&StakePosition, PointsError> {
        self.stakes.get(stake_id)
    }

    pub fn is_mature(&self, stake_id: &StakeId) -> Result<bool, PointsError> {
        Ok(self.stakes.get(stake_id)?.is_mature(self.current_epoch))
    }

    pub fn is_redeemable(&self, stake_id: &StakeId) -> Result<bool, PointsError> {
        Ok(self.stakes.get(stake_id)?.is_redeemable(self.current_epoch))
    }

    // ---------------------------------------------------------------------
    // Lending
    // ---------------------------------------------------------------------

    pub fn max_loan(&self, stake_id: &StakeId) -> Result<u64, PointsError> {
        self.loans.max_loan(self.stakes.get(stake_id)?)
    }

    pub fn open_loan(
        &mut self,
        borrower: AccountId,
        stake_id: StakeId,
        requested_points: u64,
        sink: &mut dyn EventSink,
    ) -> Result<LoanId, PointsError> {
        self.loans.open_loan(
            &mut self.ledger,
            &mut self.stakes,
            borrower,
            stake_id,
            requested_points,
            self.current_epoch,
            sink,
        )
    }

    pub fn repay_loan(
        &mut self,
        borrower: AccountId,
        loan_id: LoanId,
        stake_id: StakeId,
        sink: &mut dyn EventSink,
    ) -> Result<LoanStatement, PointsError> {
        self.loans.repay_loan(
            &mut self.ledger,
            &mut self.stakes,
            borrower,
            loan_id,
            stake_id,
            self.current_epoch,
            sink,
        )
    }

    pub fn loan(&self, loan_id: &LoanId) -> Result<&Loan, PointsError> {
        self.loans.get(loan_id)
    }

    /// Open loans of `borrower`, oldest first.
    pub fn loans_of(&self, borrower: &AccountId) -> Vec<&Loan> {
        self.loans.loans_of(borrower)
    }

    pub fn accrue_interest(&self, loan_id: &LoanId) -> Result<u64, PointsError> {
        self.loans
            .accrue_interest(self.loans.get(loan_id)?, self.current_epoch)
    }

    /// What repaying `loan_id` would cost right now.
    pub fn loan_statement(&self, loan_id: &LoanId) -> Result<LoanStatement, PointsError> {
        self.loans.statement(loan_id, self.current_epoch)
    }

    pub fn checkpoint_interest(&mut self, loan_id: &LoanId) -> Result<u64, PointsError> {
        self.loans.checkpoint_interest(loan_id, self.current_epoch)
    }

    // ---------------------------------------------------------------------
    // Oracles
    // ---------------------------------------------------------------------

    pub fn create_oracle(
        &mut self,
        cap: &OracleCap,
        symbol: &str,
        initial_rate: u128,
        decimals: u8,
        staleness_threshold_epochs: u64,
        sink: &mut dyn EventSink,
    ) -> Result<OracleId, PointsError> {
        let oracle = RateOracle::create(
            cap,
            symbol,
            initial_rate,
            decimals,
            staleness_threshold_epochs,
            self.current_epoch,
            sink,
        )?;
        let id = oracle.id();
        self.oracles.insert(id, oracle);
        Ok(id)
    }

    pub fn update_rate(
        &mut self,
        cap: &OracleCap,
        oracle_id: &OracleId,
        new_rate: u128,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        let now = self.current_epoch;
        self.oracle_mut(oracle_id)?
            .update_rate(cap, new_rate, now, sink)
    }

    pub fn update_staleness_threshold(
        &mut self,
        cap: &OracleCap,
        oracle_id: &OracleId,
        new_threshold: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.oracle_mut(oracle_id)?
            .update_staleness_threshold(cap, new_threshold, sink)
    }

    pub fn oracle(&self, oracle_id: &OracleId) -> Result<&RateOracle, PointsError> {
        self.oracles
            .get(oracle_id)
            .ok_or_else(|| PointsError::NotFound(format!("oracle {}", oracle_id)))
    }

    fn oracle_mut(&mut self, oracle_id: &OracleId) -> Result<&mut RateOracle, PointsError> {
        self.oracles
            .get_mut(oracle_id)
            .ok_or_else(|| PointsError::NotFound(format!("oracle {}", oracle_id)))
    }

    /// Look up an oracle by the symbol it was created with.
    pub fn oracle_by_symbol(&self, symbol: &str) -> Option<&RateOracle> {
        self.oracles.values().find(|o| o.symbol() == symbol)
    }

    pub fn get_rate(&self, oracle_id: &OracleId) -> Result<u128, PointsError> {
        Ok(self.oracle(oracle_id)?.rate())
    }

    pub fn is_stale(&self, oracle_id: &OracleId) -> Result<bool, PointsError> {
        Ok(self.oracle(oracle_id)?.is_stale(self.current_epoch))
    }

    /// Points worth of target asset, refusing stale rates.
    pub fn quote_points_to_asset(
        &self,
        oracle_id: &OracleId,
        points: u64,
    ) -> Result<u64, PointsError> {
        self.oracle(oracle_id)?
            .quote_points_to_asset(points, self.current_epoch)
    }

    /// Point quota equivalent to an external asset amount, refusing stale rates.
    pub fn quote_asset_to_points(
        &self,
        oracle_id: &OracleId,
        asset_amount: u64,
    ) -> Result<u64, PointsError> {
        self.oracle(oracle_id)?
            .quote_asset_to_points(asset_amount, self.current_epoch)
    }
}
