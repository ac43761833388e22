// crates/points-daemon/src/shared.rs
//
// EconomyService: the single-writer host around a PointsEconomy.
//
// Every mutating call holds the write lock for the whole operation, which
// makes operations linearizable and multi-entity operations (open/repay
// loan) atomic. Events of a successful operation are published on the
// broadcast channel while the lock is still held, so subscribers observe
// them in commit order. Failed operations publish nothing.
//
// Callers never pass an epoch: the economy's clock supplies it, and only the
// governance capability can advance it.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use points_core::{
    AccountId, ChainId, Epoch, EventLog, GovernanceCap, LoanId, OracleCap, OracleId,
    PointsError, PointsEvent, StakeId,
};
use points_economics::{Loan, LoanStatement, PointsEconomy, RateOracle, StakePosition};

/// Shared handle to the economy, cheap to clone into tasks.
#[derive(Clone)]
pub struct EconomyService {
    economy: Arc<RwLock<PointsEconomy>>,
    events: broadcast::Sender<PointsEvent>,
}

impl EconomyService {
    /// Wrap `economy` and open an event channel holding `event_buffer` events.
    pub fn new(economy: PointsEconomy, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            economy: Arc::new(RwLock::new(economy)),
            events,
        }
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PointsEvent> {
        self.events.subscribe()
    }

    /// Run `op` with exclusive access, publishing its events on success.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut PointsEconomy, &mut EventLog) -> Result<T, PointsError>,
    ) -> Result<T, PointsError> {
        let mut economy = self.economy.write().await;
        let mut log = EventLog::new();
        let result = op(&mut economy, &mut log);
        if result.is_ok() {
            for event in log.take() {
                // No subscribers is not an error.
                let _ = self.events.send(event);
            }
        }
        result
    }

    /// Run `op` against a shared snapshot.
    pub async fn read<T>(&self, op: impl FnOnce(&PointsEconomy) -> T) -> T {
        let economy = self.economy.read().await;
        op(&economy)
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    pub async fn current_epoch(&self) -> Epoch {
        self.read(|e| e.current_epoch()).await
    }

    pub async fn advance_epoch(&self, cap: &GovernanceCap, epoch: Epoch) -> Result<(), PointsError> {
        self.mutate(|e, log| e.advance_epoch(cap, epoch, log)).await
    }

    /// Advance the clock by one epoch and return the new epoch.
    pub async fn tick_epoch(&self, cap: &GovernanceCap) -> Result<Epoch, PointsError> {
        self.mutate(|e, log| {
            let next = e.current_epoch().checked_add(1).ok_or_else(|| {
                PointsError::ArithmeticOverflow("epoch counter".to_string())
            })?;
            e.advance_epoch(cap, next, log)?;
            Ok(next)
        })
        .await
    }

    // ---------------------------------------------------------------------
    // Ledger
    // ---------------------------------------------------------------------

    pub async fn earn(
        &self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
    ) -> Result<u64, PointsError> {
        self.mutate(|e, log| e.earn(cap, account, amount, log)).await
    }

    pub async fn spend(
        &self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
    ) -> Result<u64, PointsError> {
        self.mutate(|e, log| e.spend(cap, account, amount, log)).await
    }

    pub async fn lock(
        &self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
    ) -> Result<(), PointsError> {
        self.mutate(|e, log| e.lock(cap, account, amount, log)).await
    }

    pub async fn unlock(
        &self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
    ) -> Result<(), PointsError> {
        self.mutate(|e, log| e.unlock(cap, account, amount, log)).await
    }

    pub async fn set_epoch_mint_cap(&self, cap: &GovernanceCap, new_cap: u64) -> Result<(), PointsError> {
        self.mutate(|e, log| e.set_epoch_mint_cap(cap, new_cap, log))
            .await
    }

    pub async fn prune_mint_stats(&self, cap: &GovernanceCap) -> Result<usize, PointsError> {
        self.mutate(|e, _| e.prune_mint_stats(cap)).await
    }

    pub async fn available_balance(&self, account: &AccountId) -> u64 {
        self.read(|e| e.available_balance(account)).await
    }

    pub async fn locked_balance(&self, account: &AccountId) -> u64 {
        self.read(|e| e.locked_balance(account)).await
    }

    pub async fn total_supply(&self) -> u64 {
        self.read(|e| e.total_supply()).await
    }

    /// Recheck the conservation invariant under a read lock.
    pub async fn is_conserved(&self) -> bool {
        self.read(|e| e.ledger().is_conserved()).await
    }

    // ---------------------------------------------------------------------
    // Staking
    // ---------------------------------------------------------------------

    pub async fn create_stake(
        &self,
        owner: AccountId,
        chain_id: ChainId,
        principal: u64,
        duration_epochs: u64,
    ) -> Result<StakeId, PointsError> {
        self.mutate(|e, log| e.create_stake(owner, chain_id, principal, duration_epochs, log))
            .await
    }

    pub async fn redeem_stake(
        &self,
        owner: AccountId,
        stake_id: StakeId,
    ) -> Result<StakePosition, PointsError> {
        self.mutate(|e, log| e.redeem_stake(&owner, stake_id, log))
            .await
    }

    pub async fn stake(&self, stake_id: StakeId) -> Result<StakePosition, PointsError> {
        self.read(|e| e.stake(&stake_id).cloned()).await
    }

    // ---------------------------------------------------------------------
    // Lending
    // ---------------------------------------------------------------------

    pub async fn open_loan(
        &self,
        borrower: AccountId,
        stake_id: StakeId,
        requested_points: u64,
    ) -> Result<LoanId, PointsError> {
        self.mutate(|e, log| e.open_loan(borrower, stake_id, requested_points, log))
            .await
    }

    pub async fn repay_loan(
        &self,
        borrower: AccountId,
        loan_id: LoanId,
        stake_id: StakeId,
    ) -> Result<LoanStatement, PointsError> {
        self.mutate(|e, log| e.repay_loan(borrower, loan_id, stake_id, log))
            .await
    }

    pub async fn checkpoint_interest(&self, loan_id: LoanId) -> Result<u64, PointsError> {
        self.mutate(|e, _| e.checkpoint_interest(&loan_id)).await
    }

    pub async fn loan(&self, loan_id: LoanId) -> Result<Loan, PointsError> {
        self.read(|e| e.loan(&loan_id).cloned()).await
    }

    pub async fn loans_of(&self, borrower: AccountId) -> Vec<Loan> {
        self.read(|e| e.loans_of(&borrower).into_iter().cloned().collect())
            .await
    }

    /// Sum of principal over every open loan.
    pub async fn outstanding_principal(&self) -> u128 {
        self.read(|e| e.loans().outstanding_principal()).await
    }

    pub async fn loan_statement(&self, loan_id: LoanId) -> Result<LoanStatement, PointsError> {
        self.read(|e| e.loan_statement(&loan_id)).await
    }

    // ---------------------------------------------------------------------
    // Oracles
    // ---------------------------------------------------------------------

    pub async fn create_oracle(
        &self,
        cap: &OracleCap,
        symbol: &str,
        initial_rate: u128,
        decimals: u8,
        staleness_threshold_epochs: u64,
    ) -> Result<OracleId, PointsError> {
        self.mutate(|e, log| {
            e.create_oracle(
                cap,
                symbol,
                initial_rate,
                decimals,
                staleness_threshold_epochs,
                log,
            )
        })
        .await
    }

    pub async fn update_rate(
        &self,
        cap: &OracleCap,
        oracle_id: OracleId,
        new_rate: u128,
    ) -> Result<(), PointsError> {
        self.mutate(|e, log| e.update_rate(cap, &oracle_id, new_rate, log))
            .await
    }

    pub async fn update_staleness_threshold(
        &self,
        cap: &OracleCap,
        oracle_id: OracleId,
        new_threshold: u64,
    ) -> Result<(), PointsError> {
        self.mutate(|e, log| e.update_staleness_threshold(cap, &oracle_id, new_threshold, log))
            .await
    }

    pub async fn oracle(&self, oracle_id: OracleId) -> Result<RateOracle, PointsError> {
        self.read(|e| e.oracle(&oracle_id).cloned()).await
    }

    pub async fn quote_points_to_asset(
        &self,
        oracle_id: OracleId,
        points: u64,
    ) -> Result<u64, PointsError> {
        self.read(|e| e.quote_points_to_asset(&oracle_id, points))
            .await
    }

    pub async fn quote_asset_to_points(
        &self,
        oracle_id: OracleId,
        asset_amount: u64,
    ) -> Result<u64, PointsError> {
        self.read(|e| e.quote_asset_to_points(&oracle_id, asset_amount))
            .await
    }
}
