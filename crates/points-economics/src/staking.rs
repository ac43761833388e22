// crates/points-economics/src/staking.rs
//
// Stake positions: principal locked for a number of epochs.
//
// A position's principal lives in escrow outside the ledger; it never counts
// toward point supply. Lifecycle:
//   create -> (encumber <-> unencumber)* -> destroy
//
// A position can be destroyed only once it is mature
// (current_epoch >= unlock_epoch) and not encumbered by an open loan. The
// registry's `redeem` performs those guard checks; `StakePosition::destroy`
// itself does not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use points_core::{AccountId, ChainId, Epoch, EventSink, PointsError, PointsEvent, StakeId};

/// One principal deposit locked for a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    id: StakeId,
    owner: AccountId,
    chain_id: ChainId,
    principal: u64,
    start_epoch: Epoch,
    duration_epochs: u64,
    unlock_epoch: Epoch,
    encumbered: bool,
}

impl StakePosition {
    /// Build a new, unencumbered position starting at `current_epoch`.
    ///
    /// # Errors
    /// - `InvalidPrincipal` if `principal` is zero.
    /// - `InvalidDuration` if `duration_epochs` is zero, exceeds
    ///   `max_duration_epochs`, or pushes the unlock epoch past `u64::MAX`.
    pub fn create(
        owner: AccountId,
        chain_id: ChainId,
        principal: u64,
        duration_epochs: u64,
        current_epoch: Epoch,
        max_duration_epochs: u64,
    ) -> Result<Self, PointsError> {
        if principal == 0 {
            return Err(PointsError::InvalidPrincipal);
        }
        let invalid_duration = PointsError::InvalidDuration {
            duration: duration_epochs,
            max: max_duration_epochs,
        };
        if duration_epochs == 0 || duration_epochs > max_duration_epochs {
            return Err(invalid_duration);
        }
        let unlock_epoch = current_epoch
            .checked_add(duration_epochs)
            .ok_or(invalid_duration)?;

        Ok(Self {
            id: StakeId::generate(),
            owner,
            chain_id,
            principal,
            start_epoch: current_epoch,
            duration_epochs,
            unlock_epoch,
            encumbered: false,
        })
    }

    pub fn id(&self) -> StakeId {
        self.id
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn principal(&self) -> u64 {
        self.principal
    }

    pub fn start_epoch(&self) -> Epoch {
        self.start_epoch
    }

    pub fn duration_epochs(&self) -> u64 {
        self.duration_epochs
    }

    pub fn unlock_epoch(&self) -> Epoch {
        self.unlock_epoch
    }

    pub fn is_encumbered(&self) -> bool {
        self.encumbered
    }

    pub fn is_mature(&self, now_epoch: Epoch) -> bool {
        now_epoch >= self.unlock_epoch
    }

    pub fn is_redeemable(&self, now_epoch: Epoch) -> bool {
        !self.encumbered && self.is_mature(now_epoch)
    }

    /// Mark the position as collateral for a loan. Loan module only.
    pub(crate) fn encumber(&mut self, sink: &mut dyn EventSink) -> Result<(), PointsError> {
        if self.encumbered {
            return Err(PointsError::AlreadyEncumbered);
        }
        self.encumbered = true;
        sink.emit(PointsEvent::StakeEncumbered {
            stake_id: self.id,
            encumbered: true,
        });
        Ok(())
    }

    /// Release the position from loan collateral. Loan module only.
    pub(crate) fn unencumber(&mut self, sink: &mut dyn EventSink) -> Result<(), PointsError> {
        if !self.encumbered {
            return Err(PointsError::NotEncumbered);
        }
        self.encumbered = false;
        sink.emit(PointsEvent::StakeEncumbered {
            stake_id: self.id,
            encumbered: false,
        });
        Ok(())
    }

    /// Consume the position, returning its id and owner.
    ///
    /// Performs no maturity or encumbrance check; callers assert
    /// `is_redeemable` first.
    pub fn destroy(self) -> (StakeId, AccountId) {
        (self.id, self.owner)
    }
}

/// Owns every live stake position.
#[derive(Debug)]
pub struct StakeRegistry {
    positions: HashMap<StakeId, StakePosition>,
    max_duration_epochs: u64,
}

impl StakeRegistry {
    pub fn new(max_duration_epochs: u64) -> Self {
        Self {
            positions: HashMap::new(),
            max_duration_epochs,
        }
    }

    /// Open a new stake position for `owner`. Self-service: no capability.
    pub fn create(
        &mut self,
        owner: AccountId,
        chain_id: ChainId,
        principal: u64,
        duration_epochs: u64,
        current_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<StakeId, PointsError> {
        let position = StakePosition::create(
            owner,
            chain_id,
            principal,
            duration_epochs,
            current_epoch,
            self.max_duration_epochs,
        )?;
        let stake_id = position.id();

        tracing::debug!(%stake_id, %owner, principal, duration_epochs, "Stake created");
        sink.emit(PointsEvent::StakeCreated {
            stake_id,
            owner,
            chain_id: position.chain_id().clone(),
            amount: principal,
            duration: duration_epochs,
            start_epoch: position.start_epoch(),
            unlock_epoch: position.unlock_epoch(),
        });
        self.positions.insert(stake_id, position);
        Ok(stake_id)
    }

    /// Destroy a mature, unencumbered position owned by `owner`.
    ///
    /// Returns the removed position so the escrowed principal can be released.
    ///
    /// # Errors
    /// - `NotFound` if no such stake exists.
    /// - `Unauthorized` if `owner` does not own it.
    /// - `StakeEncumbered` while it backs an open loan.
    /// - `StakeNotMature` before its unlock epoch.
    pub fn redeem(
        &mut self,
        owner: &AccountId,
        stake_id: StakeId,
        now_epoch: Epoch,
        sink: &mut dyn EventSink,
    ) -> Result<StakePosition, PointsError> {
        let position = self.get(&stake_id)?;
        if position.owner() != *owner {
            return Err(PointsError::Unauthorized(format!(
                "{} does not own stake {}",
                owner, stake_id
            )));
        }
        if position.is_encumbered() {
            return Err(PointsError::StakeEncumbered);
        }
        if !position.is_mature(now_epoch) {
            return Err(PointsError::StakeNotMature {
                unlock_epoch: position.unlock_epoch(),
                current_epoch: now_epoch,
            });
        }

        let position = self
            .positions
            .remove(&stake_id)
            .ok_or_else(|| PointsError::NotFound(format!("stake {}", stake_id)))?;
        let (stake_id, owner) = position.clone().destroy();

        tracing::debug!(%stake_id, %owner, "Stake redeemed");
        sink.emit(PointsEvent::StakeDestroyed { stake_id, owner });
        Ok(position)
    }

    pub fn get(&self, stake_id: &StakeId) -> Result<&StakePosition, PointsError> {
        self.positions
            .get(stake_id)
            .ok_or_else(|| PointsError::NotFound(format!("stake {}", stake_id)))
    }

    pub(crate) fn get_mut(&mut self, stake_id: &StakeId) -> Result<&mut StakePosition, PointsError> {
        self.positions
            .get_mut(stake_id)
            .ok_or_else(|| PointsError::NotFound(format!("stake {}", stake_id)))
    }

    /// All positions owned by `owner`, ordered by id.
    pub fn stakes_of(&self, owner: &AccountId) -> Vec<&StakePosition> {
        let mut stakes: Vec<&StakePosition> = self
            .positions
            .values()
            .filter(|p| p.owner() == *owner)
            .collect();
        stakes.sort_by_key(|p| p.id());
        stakes
    }

    /// Sum of principal currently held in escrow.
    pub fn total_escrowed(&self) -> u128 {
        self.positions.values().map(|p| p.principal() as u128).sum()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MAX_STAKE_DURATION_EPOCHS;
    use points_core::{EventLog, NullSink};

    fn staker() -> AccountId {
        AccountId([1u8; 32])
    }

    fn chain() -> ChainId {
        ChainId::new("sui:mainnet")
    }

    fn make_position(principal: u64, duration: u64, epoch: Epoch) -> Result<StakePosition, PointsError> {
        StakePosition::create(
            staker(),
            chain(),
            principal,
            duration,
            epoch,
            MAX_STAKE_DURATION_EPOCHS,
        )
    }

    #[test]
    fn test_create_computes_unlock_epoch() {
        let position = make_position(1_000, 30, 0).unwrap();
        assert_eq!(position.unlock_epoch(), 30);
        assert_eq!(position.start_epoch(), 0);
        assert!(!position.is_encumbered());
    }

    #[test]
    fn test_create_zero_principal() {
        assert_eq!(make_position(0, 30, 0), Err(PointsError::InvalidPrincipal));
    }

    #[test]
    fn test_create_duration_bounds() {
        assert!(matches!(
            make_position(1, 0, 0),
            Err(PointsError::InvalidDuration { .. })
        ));
        assert!(make_position(1, MAX_STAKE_DURATION_EPOCHS, 0).is_ok());
        assert!(matches!(
            make_position(1, MAX_STAKE_DURATION_EPOCHS + 1, 0),
            Err(PointsError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_create_unlock_overflow() {
        assert!(matches!(
            make_position(1, 10, u64::MAX - 5),
            Err(PointsError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_maturity_boundary() {
        let position = make_position(1_000, 30, 10).unwrap();
        assert!(!position.is_mature(39));
        assert!(position.is_mature(40));
        assert!(position.is_redeemable(40));
    }

    #[test]
    fn test_encumber_is_binary() {
        let mut position = make_position(1_000, 30, 0).unwrap();
        position.encumber(&mut NullSink).unwrap();
        assert_eq!(
            position.encumber(&mut NullSink),
            Err(PointsError::AlreadyEncumbered)
        );
        assert!(!position.is_redeemable(100));
        position.unencumber(&mut NullSink).unwrap();
        assert_eq!(
            position.unencumber(&mut NullSink),
            Err(PointsError::NotEncumbered)
        );
        assert!(position.is_redeemable(100));
    }

    #[test]
    fn test_registry_create_emits_event() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let mut log = EventLog::new();
        let id = registry
            .create(staker(), chain(), 1_000, 30, 0, &mut log)
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_escrowed(), 1_000);
        match &log.events()[0] {
            PointsEvent::StakeCreated {
                stake_id,
                amount,
                unlock_epoch,
                ..
            } => {
                assert_eq!(*stake_id, id);
                assert_eq!(*amount, 1_000);
                assert_eq!(*unlock_epoch, 30);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_registry_create_invalid_emits_nothing() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let mut log = EventLog::new();
        assert!(registry.create(staker(), chain(), 0, 30, 0, &mut log).is_err());
        assert!(log.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_redeem_before_maturity() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let id = registry
            .create(staker(), chain(), 1_000, 30, 0, &mut NullSink)
            .unwrap();
        assert_eq!(
            registry.redeem(&staker(), id, 29, &mut NullSink),
            Err(PointsError::StakeNotMature {
                unlock_epoch: 30,
                current_epoch: 29
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_redeem_encumbered() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let id = registry
            .create(staker(), chain(), 1_000, 30, 0, &mut NullSink)
            .unwrap();
        registry.get_mut(&id).unwrap().encumber(&mut NullSink).unwrap();
        assert_eq!(
            registry.redeem(&staker(), id, 30, &mut NullSink),
            Err(PointsError::StakeEncumbered)
        );
    }

    #[test]
    fn test_redeem_by_non_owner() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let id = registry
            .create(staker(), chain(), 1_000, 30, 0, &mut NullSink)
            .unwrap();
        let stranger = AccountId([9u8; 32]);
        assert!(matches!(
            registry.redeem(&stranger, id, 30, &mut NullSink),
            Err(PointsError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_redeem_mature_position() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        let mut log = EventLog::new();
        let id = registry
            .create(staker(), chain(), 1_000, 30, 0, &mut log)
            .unwrap();
        let position = registry.redeem(&staker(), id, 30, &mut log).unwrap();
        assert_eq!(position.principal(), 1_000);
        assert!(registry.is_empty());
        assert_eq!(
            log.events().last(),
            Some(&PointsEvent::StakeDestroyed {
                stake_id: id,
                owner: staker()
            })
        );
        assert!(matches!(
            registry.redeem(&staker(), id, 31, &mut log),
            Err(PointsError::NotFound(_))
        ));
    }

    #[test]
    fn test_stakes_of_owner() {
        let mut registry = StakeRegistry::new(MAX_STAKE_DURATION_EPOCHS);
        registry
            .create(staker(), chain(), 10, 1, 0, &mut NullSink)
            .unwrap();
        registry
            .create(staker(), chain(), 20, 1, 0, &mut NullSink)
            .unwrap();
        registry
            .create(AccountId([3u8; 32]), chain(), 30, 1, 0, &mut NullSink)
            .unwrap();
        let mut principals: Vec<u64> = registry
            .stakes_of(&staker())
            .iter()
            .map(|p| p.principal())
            .collect();
        principals.sort_unstable();
        assert_eq!(principals, vec![10, 20]);
    }
}
