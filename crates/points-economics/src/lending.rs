// crates/points-economics/src/lending.rs
//
// Point loans collateralized by stake positions.
//
// Per-loan state machine: OPEN -> REPAID (terminal). Repayment is
// all-or-nothing; a repaid loan is removed from the manager.
//
// Sizing:
//   principal_as_points = stake.principal * points_per_principal_unit
//   max_loan            = floor(principal_as_points * ltv_bps / 10_000)
//
// Interest (simple, truncating):
//   interest = principal * annual_interest_bps * elapsed_epochs
//              / (10_000 * epochs_per_year)
//
// Every division truncates toward zero, so a borrower can never take or owe
// marginally less than the policy allows.
//
// Loan principal is minted into the ledger when the loan opens and burned,
// together with accrued interest, when it is repaid. Opening a loan is
// self-service and authorized by stake ownership, so the manager uses the
// ledger's crate-internal mint/burn paths rather than a governance capability.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use points_core::{
    AccountId, EarnSource, Epoch, EventSink, LoanId, PointsError, PointsEvent, SpendSource,
    StakeId,
};

use crate::ledger::Ledger;
use crate::policy::PolicyConfig;
use crate::staking::{StakePosition, StakeRegistry};
use crate::units::{apply_bps, BPS_DENOMINATOR};

/// An open point loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    borrower: AccountId,
    /// Collateral back-reference. The loan does not own the stake.
    stake_id: StakeId,
    principal_points: u64,
    /// Interest as of the last checkpoint; informational only.
    interest_owed_points: u64,
    opened_epoch: Epoch,
}

impl Loan {
    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn borrower(&self) -> AccountId {
        self.borrower
    }

    pub fn stake_id(&self) -> StakeId {
        self.stake_id
    }

    pub fn principal_points(&self) -> u64 {
        self.principal_points
    }

    pub fn interest_owed_points(&self) -> u64 {
        self.interest_owed_points
    }

    pub fn opened_epoch(&self) -> Epoch {
        self.opened_epoch
    }
}

/// What a loan owes at a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanStatement {
    pub principal_points: u64,
    pub interest_points: u64,
    pub total_due: u64,
}

/// Fixed lending parameters, taken from the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub ltv_bps: u64,
    pub annual_interest_bps: u64,
    pub epochs_per_year: u64,
    pub points_per_principal_unit: u64,
}

impl From<&PolicyConfig> for LoanTerms {
    fn from(policy: &PolicyConfig) -> Self {
        Self {
            ltv_bps: policy.ltv_bps,
            annual_interest_bps: policy.annual_interest_bps,
            epochs_per_year: policy.epochs_per_year,
            points_per_principal_unit: policy.points_per_principal_unit,
        }
    }
}

/// Simple interest on `principal` over `elapsed_epochs`, truncated.
///
/// Returns `None` if the result does not fit in u64 or `epochs_per_year` is zero.
pub fn simple_interest(
    principal: u64,
    annual_rate_bps: u64,
    elapsed_epochs: u64,
    epochs_per_year: u64,
) -> Option<u64> {
    let numerator = (principal as u128)
        .checked_mul(annual_rate_bps as u128)?
        .checked_mul(elapsed_epochs as u128)?;
    let denominator = (BPS_DENOMINATOR as u128).checked_mul(epochs_per_year as u128)?;
    if denominator == 0 {
        return None;
    }
    u64::try_from(numerator / denominator).ok()
}

/// Opens, tracks, and settles collateralized loans.
#[derive(Debug)]
pub struct LoanManager {
    loans: HashMap<LoanId, Loan>,
    terms: LoanTerms,
}

impl LoanManager {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            loans: HashMap::new(),
            terms,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// The largest loan `stake` can back.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the principal cannot be expressed in points.
    pub fn max_loan(&self, stake: &StakePosition) -> Result<u64, PointsError> {
        let principal_as_points = stake
            .principal()
            .checked_mul(self.terms.points_per_principal_unit)
            .ok_or_else(|| {
                PointsError::ArithmeticOverflow(format!(
                    "stake principal {} in points",
                    stake.principal()
                ))
            })?;
        Ok(apply_bps(principal_as_points, self.terms.ltv_bps))
    }

    /// Borrow `requested_points` against `stake_id`, minting them to `borrower`.
    ///
    /// Runs against the ledger and the stake registry as one unit: every
    /// check happens before the first mutation, so a failure leaves both
    /// untouched.
    ///
    /// # Errors
    /// - `NotFound` if the stake does not exist.
    /// - `Unauthorized` if `borrower` does not own the stake.
    /// - `InvalidAmount` if `requested_points` is zero.
    /// - `AlreadyEncumbered` if the stake already backs a loan.
    /// - `EpochInPast` if `current_epoch` precedes the stake's start.
    /// - `ExceedsMaxLtv` if `requested_points` is above `max_loan`.
    /// - `DailyCapExceeded` / `ArithmeticOverflow` from the ledger mint check.
    #[allow(clippy::too_many_arguments)]
    pub fn open_loan(
        &mut self,
        ledger: &mut Ledger,
        stakes: &mut StakeRegistry,
        borrower: AccountId,
        stake_id: StakeId,
        requested_points: u64,
        current_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<LoanId, PointsError> {
        let stake = stakes.get(&stake_id)?;
        if stake.owner() != borrower {
            return Err(PointsError::Unauthorized(format!(
                "{} does not own stake {}",
                borrower, stake_id
            )));
        }
        if requested_points == 0 {
            return Err(PointsError::InvalidAmount);
        }
        if stake.is_encumbered() {
            return Err(PointsError::AlreadyEncumbered);
        }
        if current_epoch < stake.start_epoch() {
            return Err(PointsError::EpochInPast {
                epoch: current_epoch,
                earliest: stake.start_epoch(),
            });
        }
        let max_loan = self.max_loan(stake)?;
        if requested_points > max_loan {
            return Err(PointsError::ExceedsMaxLtv {
                requested: requested_points,
                max_loan,
            });
        }
        ledger.check_mint(&borrower, requested_points, current_epoch)?;

        let loan_id = LoanId::generate();
        ledger.mint(
            borrower,
            requested_points,
            current_epoch,
            EarnSource::Loan { loan_id },
            sink,
        )?;
        stakes.get_mut(&stake_id)?.encumber(sink)?;
        self.loans.insert(
            loan_id,
            Loan {
                id: loan_id,
                borrower,
                stake_id,
                principal_points: requested_points,
                interest_owed_points: 0,
                opened_epoch: current_epoch,
            },
        );

        tracing::info!(%loan_id, %borrower, %stake_id, requested_points, max_loan, "Loan opened");
        sink.emit(PointsEvent::LoanOpened {
            loan_id,
            borrower,
            stake_id,
            principal_points: requested_points,
            opened_epoch: current_epoch,
        });
        Ok(loan_id)
    }

    /// Interest accrued on `loan` by `current_epoch`. Pure.
    ///
    /// # Errors
    /// - `EpochInPast` if `current_epoch` precedes the loan's opening epoch.
    /// - `ArithmeticOverflow` if the interest does not fit in u64.
    pub fn accrue_interest(&self, loan: &Loan, current_epoch: Epoch) -> Result<u64, PointsError> {
        let elapsed = current_epoch
            .checked_sub(loan.opened_epoch)
            .ok_or(PointsError::EpochInPast {
                epoch: current_epoch,
                earliest: loan.opened_epoch,
            })?;
        simple_interest(
            loan.principal_points,
            self.terms.annual_interest_bps,
            elapsed,
            self.terms.epochs_per_year,
        )
        .ok_or_else(|| {
            PointsError::ArithmeticOverflow(format!(
                "interest on {} points over {} epochs",
                loan.principal_points, elapsed
            ))
        })
    }

    /// Principal, interest, and total due for `loan_id` at `current_epoch`.
    pub fn statement(&self, loan_id: &LoanId, current_epoch: Epoch) -> Result<LoanStatement, PointsError> {
        let loan = self.get(loan_id)?;
        let interest_points = self.accrue_interest(loan, current_epoch)?;
        let total_due = loan
            .principal_points
            .checked_add(interest_points)
            .ok_or_else(|| {
                PointsError::ArithmeticOverflow(format!("total due on loan {}", loan_id))
            })?;
        Ok(LoanStatement {
            principal_points: loan.principal_points,
            interest_points,
            total_due,
        })
    }

    /// Store the interest accrued by `current_epoch` on the loan record for
    /// display. Does not change what repayment will charge.
    pub fn checkpoint_interest(&mut self, loan_id: &LoanId, current_epoch: Epoch) -> Result<u64, PointsError> {
        let interest = self.accrue_interest(self.get(loan_id)?, current_epoch)?;
        let loan = self
            .loans
            .get_mut(loan_id)
            .ok_or_else(|| PointsError::NotFound(format!("loan {}", loan_id)))?;
        loan.interest_owed_points = interest;
        Ok(interest)
    }

    /// Repay `loan_id` in full: burn principal plus interest from the
    /// borrower's available balance and release the collateral.
    ///
    /// # Errors
    /// - `NotFound` if the loan or stake does not exist.
    /// - `Unauthorized` if `borrower` did not take the loan.
    /// - `CollateralMismatch` if `stake_id` is not the loan's collateral.
    /// - `NotEncumbered` if the collateral is not encumbered.
    /// - `EpochInPast` if `current_epoch` precedes the loan's opening epoch.
    /// - `InsufficientBalance` if the borrower cannot cover the total due.
    #[allow(clippy::too_many_arguments)]
    pub fn repay_loan(
        &mut self,
        ledger: &mut Ledger,
        stakes: &mut StakeRegistry,
        borrower: AccountId,
        loan_id: LoanId,
        stake_id: StakeId,
        current_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<LoanStatement, PointsError> {
        let loan = self.get(&loan_id)?;
        if loan.borrower != borrower {
            return Err(PointsError::Unauthorized(format!(
                "{} is not the borrower of loan {}",
                borrower, loan_id
            )));
        }
        if loan.stake_id != stake_id {
            return Err(PointsError::CollateralMismatch);
        }
        if !stakes.get(&stake_id)?.is_encumbered() {
            return Err(PointsError::NotEncumbered);
        }
        let statement = self.statement(&loan_id, current_epoch)?;
        let available = ledger.available_balance(&borrower);
        if available < statement.total_due {
            return Err(PointsError::InsufficientBalance {
                requested: statement.total_due,
                available,
            });
        }

        ledger.burn(
            borrower,
            statement.total_due,
            SpendSource::LoanRepayment { loan_id },
            sink,
        )?;
        stakes.get_mut(&stake_id)?.unencumber(sink)?;
        self.loans.remove(&loan_id);

        tracing::info!(
            %loan_id,
            %borrower,
            principal = statement.principal_points,
            interest = statement.interest_points,
            "Loan repaid"
        );
        sink.emit(PointsEvent::LoanRepaid {
            loan_id,
            borrower,
            stake_id,
            principal_points: statement.principal_points,
            interest_points: statement.interest_points,
            repaid_epoch: current_epoch,
        });
        Ok(statement)
    }

    pub fn get(&self, loan_id: &LoanId) -> Result<&Loan, PointsError> {
        self.loans
            .get(loan_id)
            .ok_or_else(|| PointsError::NotFound(format!("loan {}", loan_id)))
    }

    /// The open loan backed by `stake_id`, if any.
    pub fn loan_for_stake(&self, stake_id: &StakeId) -> Option<&Loan> {
        self.loans.values().find(|l| l.stake_id == *stake_id)
    }

    /// Open loans taken by `borrower`, oldest first.
    pub fn loans_of(&self, borrower: &AccountId) -> Vec<&Loan> {
        let mut loans: Vec<&Loan> = self
            .loans
            .values()
            .filter(|l| l.borrower == *borrower)
            .collect();
        loans.sort_by_key(|l| (l.opened_epoch, l.id));
        loans
    }

    /// Total outstanding loan principal.
    pub fn outstanding_principal(&self) -> u128 {
        self.loans.values().map(|l| l.principal_points as u128).sum()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MAX_STAKE_DURATION_EPOCHS;
    use points_core::{issue_genesis_capabilities, ChainId, EventLog, GovernanceCap, NullSink};

    fn borrower() -> AccountId {
        AccountId([5u8; 32])
    }

    struct Fixture {
        gov: GovernanceCap,
        ledger: Ledger,
        stakes: StakeRegistry,
        loans: LoanManager,
        log: EventLog,
    }

    fn fixture() -> Fixture {
        let caps = issue_genesis_capabilities();
        let policy = PolicyConfig::default();
        Fixture {
            ledger: Ledger::new(&caps.governance, policy.epoch_mint_cap),
            gov: caps.governance,
            stakes: StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS),
            loans: LoanManager::new(LoanTerms::from(&policy)),
            log: EventLog::new(),
        }
    }

    fn stake(f: &mut Fixture, principal: u64) -> StakeId {
        f.stakes
            .create(borrower(), ChainId::new("sui"), principal, 30, 0, &mut NullSink)
            .unwrap()
    }

    #[test]
    fn test_simple_interest_truncates() {
        // 1000 * 5% * 30/365 = 4.109...
        assert_eq!(simple_interest(1_000, 500, 30, 365), Some(4));
        assert_eq!(simple_interest(1_000, 500, 365, 365), Some(50));
        assert_eq!(simple_interest(1_000, 500, 0, 365), Some(0));
        assert_eq!(simple_interest(1_000, 500, 1, 0), None);
        assert_eq!(simple_interest(u64::MAX, u64::MAX, u64::MAX, 1), None);
    }

    #[test]
    fn test_ltv_boundary() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let max = f.loans.max_loan(f.stakes.get(&id).unwrap()).unwrap();
        assert_eq!(max, 700);

        let err = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, max + 1, 0, &mut f.log)
            .unwrap_err();
        assert_eq!(
            err,
            PointsError::ExceedsMaxLtv {
                requested: 701,
                max_loan: 700
            }
        );
        assert!(f.log.is_empty());

        f.loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, max, 0, &mut f.log)
            .unwrap();
        assert_eq!(f.ledger.available_balance(&borrower()), 700);
    }

    #[test]
    fn test_ltv_rounds_down() {
        let mut f = fixture();
        let id = stake(&mut f, 999);
        assert_eq!(f.loans.max_loan(f.stakes.get(&id).unwrap()).unwrap(), 699);
    }

    #[test]
    fn test_open_loan_effects_and_events() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 3, &mut f.log)
            .unwrap();

        assert!(f.stakes.get(&id).unwrap().is_encumbered());
        assert_eq!(f.ledger.total_supply(), 700);
        let loan = f.loans.get(&loan_id).unwrap();
        assert_eq!(loan.opened_epoch(), 3);
        assert_eq!(loan.stake_id(), id);
        assert_eq!(f.loans.loan_for_stake(&id).map(|l| l.id()), Some(loan_id));

        let names: Vec<&str> = f.log.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Earned", "StakeEncumbered", "LoanOpened"]);
        assert!(matches!(
            f.log.events()[0],
            PointsEvent::Earned {
                source: EarnSource::Loan { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_encumbrance_exclusivity() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        f.loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 100, 0, &mut f.log)
            .unwrap();
        for requested in [1, 100, 10_000] {
            let err = f
                .loans
                .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, requested, 0, &mut f.log)
                .unwrap_err();
            assert_eq!(err, PointsError::AlreadyEncumbered);
        }
        assert_eq!(f.loans.len(), 1);
        assert_eq!(f.ledger.total_supply(), 100);
    }

    #[test]
    fn test_open_loan_by_non_owner() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let err = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, AccountId([6u8; 32]), id, 10, 0, &mut f.log)
            .unwrap_err();
        assert!(matches!(err, PointsError::Unauthorized(_)));
        assert!(!f.stakes.get(&id).unwrap().is_encumbered());
    }

    #[test]
    fn test_open_loan_over_mint_cap_leaves_stake_free() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let cap = f.ledger.epoch_mint_cap();
        f.ledger
            .earn(&f.gov, borrower(), cap - 50, 0, &mut f.log)
            .unwrap();
        let err = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 100, 0, &mut f.log)
            .unwrap_err();
        assert!(matches!(err, PointsError::DailyCapExceeded { .. }));
        assert!(!f.stakes.get(&id).unwrap().is_encumbered());
        assert!(f.loans.is_empty());
        assert_eq!(f.log.len(), 1);
    }

    #[test]
    fn test_repay_burns_principal_plus_interest() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 0, &mut f.log)
            .unwrap();
        // 700 * 5% * 73/365 = 7
        f.ledger.earn(&f.gov, borrower(), 7, 73, &mut f.log).unwrap();

        let statement = f
            .loans
            .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), loan_id, id, 73, &mut f.log)
            .unwrap();
        assert_eq!(statement.interest_points, 7);
        assert_eq!(statement.total_due, 707);
        assert_eq!(f.ledger.available_balance(&borrower()), 0);
        assert_eq!(f.ledger.total_supply(), 0);
        assert!(!f.stakes.get(&id).unwrap().is_encumbered());
        assert!(f.loans.is_empty());
        assert!(matches!(
            f.log.events().last(),
            Some(PointsEvent::LoanRepaid {
                interest_points: 7,
                ..
            })
        ));
    }

    #[test]
    fn test_repay_insufficient_balance_is_atomic() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 0, &mut f.log)
            .unwrap();
        let events_before = f.log.len();

        let err = f
            .loans
            .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), loan_id, id, 365, &mut f.log)
            .unwrap_err();
        assert_eq!(
            err,
            PointsError::InsufficientBalance {
                requested: 735,
                available: 700
            }
        );
        assert_eq!(f.ledger.available_balance(&borrower()), 700);
        assert!(f.stakes.get(&id).unwrap().is_encumbered());
        assert_eq!(f.loans.len(), 1);
        assert_eq!(f.log.len(), events_before);
    }

    #[test]
    fn test_repay_wrong_collateral() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let other = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 10, 0, &mut f.log)
            .unwrap();
        assert_eq!(
            f.loans
                .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), loan_id, other, 0, &mut f.log),
            Err(PointsError::CollateralMismatch)
        );
    }

    #[test]
    fn test_repay_by_stranger() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 10, 0, &mut f.log)
            .unwrap();
        assert!(matches!(
            f.loans.repay_loan(
                &mut f.ledger,
                &mut f.stakes,
                AccountId([6u8; 32]),
                loan_id,
                id,
                0,
                &mut f.log
            ),
            Err(PointsError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_stake_reusable_after_repay() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let first = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 300, 0, &mut f.log)
            .unwrap();
        f.loans
            .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), first, id, 0, &mut f.log)
            .unwrap();
        assert!(f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 1, &mut f.log)
            .is_ok());
    }

    #[test]
    fn test_checkpoint_and_statement() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 10, &mut f.log)
            .unwrap();
        assert_eq!(f.loans.checkpoint_interest(&loan_id, 375).unwrap(), 35);
        assert_eq!(f.loans.get(&loan_id).unwrap().interest_owed_points(), 35);
        let statement = f.loans.statement(&loan_id, 375).unwrap();
        assert_eq!(statement.total_due, 735);
        assert_eq!(f.loans.statement(&loan_id, 10).unwrap().interest_points, 0);
        assert_eq!(
            f.loans.statement(&loan_id, 5),
            Err(PointsError::EpochInPast {
                epoch: 5,
                earliest: 10
            })
        );
    }

    #[test]
    fn test_repay_before_opening_epoch_rejected() {
        let mut f = fixture();
        let id = stake(&mut f, 1_000);
        let loan_id = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 700, 365, &mut f.log)
            .unwrap();
        assert_eq!(f.loans.statement(&loan_id, 730).unwrap().total_due, 735);
        let events_before = f.log.len();

        let err = f
            .loans
            .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), loan_id, id, 0, &mut f.log)
            .unwrap_err();
        assert_eq!(
            err,
            PointsError::EpochInPast {
                epoch: 0,
                earliest: 365
            }
        );
        assert_eq!(f.ledger.available_balance(&borrower()), 700);
        assert!(f.stakes.get(&id).unwrap().is_encumbered());
        assert_eq!(f.loans.len(), 1);
        assert_eq!(f.log.len(), events_before);
    }

    #[test]
    fn test_open_loan_before_stake_start_rejected() {
        let mut f = fixture();
        let id = f
            .stakes
            .create(borrower(), ChainId::new("sui"), 1_000, 30, 50, &mut NullSink)
            .unwrap();
        assert!(matches!(
            f.loans
                .open_loan(&mut f.ledger, &mut f.stakes, borrower(), id, 100, 49, &mut f.log),
            Err(PointsError::EpochInPast { earliest: 50, .. })
        ));
        assert!(!f.stakes.get(&id).unwrap().is_encumbered());
        assert_eq!(f.ledger.total_supply(), 0);
    }

    #[test]
    fn test_loans_of_and_outstanding_principal() {
        let mut f = fixture();
        let first = stake(&mut f, 1_000);
        let second = stake(&mut f, 500);
        let a = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), first, 700, 1, &mut f.log)
            .unwrap();
        let b = f
            .loans
            .open_loan(&mut f.ledger, &mut f.stakes, borrower(), second, 200, 2, &mut f.log)
            .unwrap();

        let ids: Vec<LoanId> = f.loans.loans_of(&borrower()).iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(f.loans.loans_of(&AccountId([6u8; 32])).is_empty());
        assert_eq!(f.loans.outstanding_principal(), 900);

        f.loans
            .repay_loan(&mut f.ledger, &mut f.stakes, borrower(), a, first, 1, &mut f.log)
            .unwrap();
        assert_eq!(f.loans.outstanding_principal(), 200);
    }
}
