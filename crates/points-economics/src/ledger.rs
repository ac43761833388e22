// crates/points-economics/src/ledger.rs
//
// Point balances, global supply, and per-epoch issuance caps.
//
// Each account holds two balances:
//   - available: spendable points
//   - locked:    points held for an in-flight obligation (e.g. an escrowed
//                perk claim)
//
// Conservation invariant, maintained by every operation:
//   total_supply == Σ (available[a] + locked[a])
//
// Issuance is rate-limited per (account, epoch). The key includes the epoch,
// so the cap resets in full at every epoch boundary rather than sliding.
// Pruning counters raises a floor below which no epoch can be minted into,
// so a discarded counter never reopens its epoch's cap.

use std::collections::HashMap;

use points_core::{
    AccountId, CapabilityId, EarnSource, Epoch, EventSink, GovernanceCap, PointsError,
    PointsEvent, SpendSource,
};

/// The global point ledger.
///
/// Bound at construction to the governance capability that created it; all
/// public mutators require that capability.
#[derive(Debug)]
pub struct Ledger {
    governance: CapabilityId,
    available: HashMap<AccountId, u64>,
    locked: HashMap<AccountId, u64>,
    total_supply: u64,
    /// Points minted per (account, epoch).
    mint_stats: HashMap<(AccountId, Epoch), u64>,
    /// Epochs below this have had their counters pruned.
    mint_floor_epoch: Epoch,
    epoch_mint_cap: u64,
}

impl Ledger {
    /// Create an empty ledger governed by `cap`.
    pub fn new(cap: &GovernanceCap, epoch_mint_cap: u64) -> Self {
        Self {
            governance: cap.id(),
            available: HashMap::new(),
            locked: HashMap::new(),
            total_supply: 0,
            mint_stats: HashMap::new(),
            mint_floor_epoch: 0,
            epoch_mint_cap,
        }
    }

    /// Fingerprint of the governance capability this ledger is bound to.
    pub fn governance(&self) -> CapabilityId {
        self.governance
    }

    fn authorize(&self, cap: &GovernanceCap, operation: &str) -> Result<(), PointsError> {
        cap.authorize(self.governance).inspect_err(|_| {
            tracing::warn!("Rejected ledger {} with foreign governance capability", operation);
        })
    }

    /// Mint `amount` points to `account` during `epoch`.
    ///
    /// Returns the account's new available balance.
    ///
    /// # Errors
    /// - `Unauthorized` if `cap` is not this ledger's governance capability.
    /// - `InvalidAmount` if `amount` is zero.
    /// - `EpochInPast` if `epoch` lies below the pruned mint floor.
    /// - `DailyCapExceeded` if the account's mints in `epoch` would exceed the cap.
    /// - `ArithmeticOverflow` if total supply would overflow.
    pub fn earn(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        self.authorize(cap, "earn")?;
        self.mint(account, amount, epoch, EarnSource::Reward, sink)
    }

    /// Burn `amount` available points from `account`.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidAmount`.
    /// - `InsufficientBalance` if available points are short.
    pub fn spend(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        self.authorize(cap, "spend")?;
        self.burn(account, amount, SpendSource::Spend, sink)
    }

    /// Move `amount` from the available to the locked balance. Total supply
    /// is unchanged.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidAmount`.
    /// - `InsufficientBalance` if available points are short.
    pub fn lock(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.authorize(cap, "lock")?;
        if amount == 0 {
            return Err(PointsError::InvalidAmount);
        }
        let available = self.available_balance(&account);
        if available < amount {
            return Err(PointsError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let new_available = available - amount;
        // locked + available <= total_supply, so this cannot overflow
        let new_locked = self.locked_balance(&account) + amount;
        self.available.insert(account, new_available);
        self.locked.insert(account, new_locked);

        tracing::debug!(%account, amount, new_locked, "Locked points");
        sink.emit(PointsEvent::Locked {
            account,
            amount,
            new_available,
            new_locked,
        });
        Ok(())
    }

    /// Move `amount` from the locked back to the available balance.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidAmount`.
    /// - `InsufficientLockedBalance` if locked points are short.
    pub fn unlock(
        &mut self,
        cap: &GovernanceCap,
        account: AccountId,
        amount: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.authorize(cap, "unlock")?;
        if amount == 0 {
            return Err(PointsError::InvalidAmount);
        }
        let locked = self.locked_balance(&account);
        if locked < amount {
            return Err(PointsError::InsufficientLockedBalance {
                requested: amount,
                locked,
            });
        }

        let new_locked = locked - amount;
        let new_available = self.available_balance(&account) + amount;
        self.locked.insert(account, new_locked);
        self.available.insert(account, new_available);

        tracing::debug!(%account, amount, new_available, "Unlocked points");
        sink.emit(PointsEvent::Unlocked {
            account,
            amount,
            new_available,
            new_locked,
        });
        Ok(())
    }

    /// Replace the per-account, per-epoch issuance cap.
    ///
    /// Already-recorded mint statistics are kept; an account that minted more
    /// than a lowered cap simply cannot mint again until the next epoch.
    pub fn set_epoch_mint_cap(
        &mut self,
        cap: &GovernanceCap,
        new_cap: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), PointsError> {
        self.authorize(cap, "set_epoch_mint_cap")?;
        if new_cap == 0 {
            return Err(PointsError::InvalidAmount);
        }
        let old_cap = self.epoch_mint_cap;
        self.epoch_mint_cap = new_cap;
        tracing::info!(old_cap, new_cap, "Epoch mint cap updated");
        sink.emit(PointsEvent::EpochMintCapUpdated { old_cap, new_cap });
        Ok(())
    }

    /// Drop mint statistics for epochs before `before_epoch` and close those
    /// epochs to further minting. The floor never moves backwards.
    ///
    /// Returns the number of entries removed.
    pub fn prune_mint_stats(
        &mut self,
        cap: &GovernanceCap,
        before_epoch: Epoch,
    ) -> Result<usize, PointsError> {
        self.authorize(cap, "prune_mint_stats")?;
        self.mint_floor_epoch = self.mint_floor_epoch.max(before_epoch);
        let floor = self.mint_floor_epoch;
        let before = self.mint_stats.len();
        self.mint_stats.retain(|(_, epoch), _| *epoch >= floor);
        let removed = before - self.mint_stats.len();
        tracing::debug!(floor, removed, "Pruned mint statistics");
        Ok(removed)
    }

    /// Issue points without a capability check. Only the loan module calls
    /// this; it is authorized by stake ownership instead.
    pub(crate) fn mint(
        &mut self,
        account: AccountId,
        amount: u64,
        epoch: Epoch,
        source: EarnSource,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        self.check_mint(&account, amount, epoch)?;

        let minted = self.minted_in_epoch(&account, epoch);
        // check_mint guarantees neither sum overflows
        let new_available = self.available_balance(&account) + amount;
        self.total_supply += amount;
        self.available.insert(account, new_available);
        self.mint_stats.insert((account, epoch), minted + amount);

        tracing::debug!(%account, amount, epoch, new_available, "Minted points");
        sink.emit(PointsEvent::Earned {
            account,
            amount,
            epoch,
            source,
            new_available,
        });
        Ok(new_available)
    }

    /// Validate a mint without applying it.
    pub(crate) fn check_mint(
        &self,
        account: &AccountId,
        amount: u64,
        epoch: Epoch,
    ) -> Result<(), PointsError> {
        if amount == 0 {
            return Err(PointsError::InvalidAmount);
        }
        if epoch < self.mint_floor_epoch {
            return Err(PointsError::EpochInPast {
                epoch,
                earliest: self.mint_floor_epoch,
            });
        }
        let minted = self.minted_in_epoch(account, epoch);
        match minted.checked_add(amount) {
            Some(total) if total <= self.epoch_mint_cap => {}
            _ => {
                return Err(PointsError::DailyCapExceeded {
                    epoch,
                    minted,
                    requested: amount,
                    cap: self.epoch_mint_cap,
                })
            }
        }
        if self.total_supply.checked_add(amount).is_none() {
            return Err(PointsError::ArithmeticOverflow(format!(
                "total supply {} + {} exceeds u64",
                self.total_supply, amount
            )));
        }
        Ok(())
    }

    /// Burn points without a capability check. Only the loan module calls this.
    pub(crate) fn burn(
        &mut self,
        account: AccountId,
        amount: u64,
        source: SpendSource,
        sink: &mut dyn EventSink,
    ) -> Result<u64, PointsError> {
        if amount == 0 {
            return Err(PointsError::InvalidAmount);
        }
        let available = self.available_balance(&account);
        if available < amount {
            return Err(PointsError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let new_available = available - amount;
        self.available.insert(account, new_available);
        self.total_supply -= amount;

        tracing::debug!(%account, amount, new_available, "Burned points");
        sink.emit(PointsEvent::Spent {
            account,
            amount,
            source,
            new_available,
        });
        Ok(new_available)
    }

    pub fn available_balance(&self, account: &AccountId) -> u64 {
        self.available.get(account).copied().unwrap_or(0)
    }

    pub fn locked_balance(&self, account: &AccountId) -> u64 {
        self.locked.get(account).copied().unwrap_or(0)
    }

    /// Available plus locked points of `account`.
    pub fn total_balance(&self, account: &AccountId) -> u64 {
        self.available_balance(account) + self.locked_balance(account)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn epoch_mint_cap(&self) -> u64 {
        self.epoch_mint_cap
    }

    /// Earliest epoch that can still be minted into.
    pub fn mint_floor_epoch(&self) -> Epoch {
        self.mint_floor_epoch
    }

    /// Points minted to `account` during `epoch`.
    pub fn minted_in_epoch(&self, account: &AccountId, epoch: Epoch) -> u64 {
        self.mint_stats.get(&(*account, epoch)).copied().unwrap_or(0)
    }

    /// Points `account` may still be minted during `epoch`.
    pub fn remaining_mint_allowance(&self, account: &AccountId, epoch: Epoch) -> u64 {
        if epoch < self.mint_floor_epoch {
            return 0;
        }
        self.epoch_mint_cap
            .saturating_sub(self.minted_in_epoch(account, epoch))
    }

    /// Number of accounts that have ever held a balance.
    pub fn account_count(&self) -> usize {
        self.available
            .keys()
            .chain(self.locked.keys())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Recompute Σ(available + locked) and compare it with `total_supply`.
    pub fn is_conserved(&self) -> bool {
        let sum: u128 = self
            .available
            .values()
            .chain(self.locked.values())
            .map(|v| *v as u128)
            .sum();
        sum == self.total_supply as u128
    }
}
