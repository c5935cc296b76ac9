//! In-memory position store
//!
//! Owns the ordered collection of staking positions. Mutation goes through
//! the three `apply_*` operations only, and each one checks all of its
//! preconditions before writing so that a failure never changes state.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Result, StakingError};
use crate::reward_math::projected_reward;
use crate::types::{PortfolioSummary, StakingPosition};

#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    positions: Vec<StakingPosition>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an initial set, rejecting duplicate ids
    pub fn with_positions(positions: impl IntoIterator<Item = StakingPosition>) -> Result<Self> {
        let mut store = Self::new();
        for position in positions {
            store.insert(position)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, position: StakingPosition) -> Result<()> {
        if self.index_of(position.id()).is_some() {
            return Err(StakingError::DuplicatePosition {
                position_id: position.id().to_string(),
            });
        }
        self.positions.push(position);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&StakingPosition> {
        self.positions
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| StakingError::position_not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Snapshot of all positions in insertion order
    pub fn list(&self) -> Vec<StakingPosition> {
        self.positions.clone()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary::from_positions(&self.positions)
    }

    /// Add principal and recompute pending rewards against the new total
    pub fn apply_deposit(&mut self, id: &str, amount: Decimal) -> Result<&StakingPosition> {
        if amount <= Decimal::ZERO {
            return Err(StakingError::InvalidAmount { amount });
        }
        let position = self.get_mut(id)?;
        let total = position
            .total_deposited
            .checked_add(amount)
            .ok_or(StakingError::InvalidAmount { amount })?;
        let pending = projected_reward(total, position.apy, position.lock_days)
            .map_err(|_| StakingError::InvalidAmount { amount })?;

        position.total_deposited = total;
        position.pending_rewards = pending;

        debug!(
            position_id = %id,
            total_deposited = %position.total_deposited,
            pending_rewards = %position.pending_rewards,
            "Deposit applied"
        );
        Ok(position)
    }

    /// Move all pending rewards into `earned`. Returns the claimed amount.
    pub fn apply_claim(&mut self, id: &str) -> Result<Decimal> {
        let position = self.get_mut(id)?;
        if !position.has_claimable_rewards() {
            return Err(StakingError::nothing_to_claim(id));
        }

        let claimed = position.pending_rewards;
        let earned = position
            .earned
            .checked_add(claimed)
            .ok_or(StakingError::InvalidAmount { amount: claimed })?;

        position.earned = earned;
        position.pending_rewards = Decimal::ZERO;

        debug!(position_id = %id, claimed = %claimed, earned = %position.earned, "Claim applied");
        Ok(claimed)
    }

    /// Remove principal, clamped at zero. Returns the amount actually withdrawn.
    pub fn apply_withdrawal(&mut self, id: &str, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(StakingError::InvalidAmount { amount });
        }
        let position = self.get_mut(id)?;

        let withdrawn = amount.min(position.total_deposited);
        let remaining = position.total_deposited - withdrawn;
        let pending = projected_reward(remaining, position.apy, position.lock_days)?;

        position.total_deposited = remaining;
        position.pending_rewards = pending;

        debug!(
            position_id = %id,
            withdrawn = %withdrawn,
            total_deposited = %position.total_deposited,
            "Withdrawal applied"
        );
        Ok(withdrawn)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.iter().position(|p| p.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut StakingPosition> {
        self.positions
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| StakingError::position_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_positions::create_seed_positions;

    fn seeded() -> PositionStore {
        PositionStore::with_positions(create_seed_positions().unwrap()).unwrap()
    }

    fn position(id: &str, deposited: i64, pending: i64, earned: i64) -> StakingPosition {
        StakingPosition::new(id, id, Decimal::from(10), 30)
            .unwrap()
            .with_balances(
                Decimal::from(deposited),
                Decimal::from(pending),
                Decimal::from(earned),
            )
    }

    #[test]
    fn test_deposit_recomputes_pending() {
        let mut store = seeded();
        let updated = store.apply_deposit("btc", Decimal::from(500)).unwrap();

        assert_eq!(updated.total_deposited, Decimal::from(4000));
        assert_eq!(
            updated.pending_rewards,
            projected_reward(Decimal::from(4000), Decimal::new(156, 1), 7).unwrap()
        );
        assert_eq!(updated.pending_rewards.round_dp(2), Decimal::new(1197, 2));
    }

    #[test]
    fn test_deposit_rejects_non_positive_amount() {
        let mut store = seeded();
        let before = store.list();

        assert!(matches!(
            store.apply_deposit("btc", Decimal::ZERO),
            Err(StakingError::InvalidAmount { .. })
        ));
        assert!(matches!(
            store.apply_deposit("btc", Decimal::from(-10)),
            Err(StakingError::InvalidAmount { .. })
        ));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_large_deposit_keeps_exact_pending() {
        let mut store = seeded();
        let amount = Decimal::from_i128_with_scale(10_i128.pow(28), 0);

        let updated = store.apply_deposit("btc", amount).unwrap();
        let total = amount + Decimal::from(3500);
        assert_eq!(updated.total_deposited, total);
        assert_eq!(
            updated.pending_rewards,
            projected_reward(total, Decimal::new(156, 1), 7).unwrap()
        );
        let floor = Decimal::from_i128_with_scale(29_917_808_219_178_082_191_780_821, 0);
        assert!(updated.pending_rewards > floor);
    }

    #[test]
    fn test_deposit_overflow_is_noop() {
        let mut store = seeded();
        let before = store.list();

        // principal overflow
        assert_eq!(
            store.apply_deposit("btc", Decimal::MAX).unwrap_err(),
            StakingError::InvalidAmount { amount: Decimal::MAX }
        );
        assert_eq!(store.list(), before);

        // principal fits, projected reward does not
        let huge = StakingPosition::new("huge", "Huge", Decimal::from(1000), 365)
            .unwrap()
            .with_balances(Decimal::MAX - Decimal::ONE, Decimal::ZERO, Decimal::ZERO);
        let mut store = PositionStore::with_positions(vec![huge]).unwrap();
        let before = store.list();
        assert_eq!(
            store.apply_deposit("huge", Decimal::ONE).unwrap_err(),
            StakingError::InvalidAmount { amount: Decimal::ONE }
        );
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_claim_overflow_is_noop() {
        let full = StakingPosition::new("full", "Full", Decimal::from(10), 30)
            .unwrap()
            .with_balances(Decimal::from(1000), Decimal::from(100), Decimal::MAX);
        let mut store = PositionStore::with_positions(vec![full]).unwrap();
        let before = store.list();

        assert_eq!(
            store.apply_claim("full").unwrap_err(),
            StakingError::InvalidAmount { amount: Decimal::from(100) }
        );
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_unknown_position() {
        let mut store = seeded();
        let before = store.list();

        assert_eq!(
            store.apply_deposit("doge", Decimal::ONE).unwrap_err(),
            StakingError::position_not_found("doge")
        );
        assert!(store.apply_claim("doge").is_err());
        assert!(store.apply_withdrawal("doge", Decimal::ONE).is_err());
        assert!(store.get("doge").is_err());
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_claim_moves_pending_into_earned() {
        let mut store = PositionStore::with_positions(vec![position("p", 1000, 100, 50)]).unwrap();

        let claimed = store.apply_claim("p").unwrap();
        assert_eq!(claimed, Decimal::from(100));

        let p = store.get("p").unwrap();
        assert_eq!(p.pending_rewards, Decimal::ZERO);
        assert_eq!(p.earned, Decimal::from(150));
    }

    #[test]
    fn test_claim_with_nothing_pending() {
        let mut store = PositionStore::with_positions(vec![position("p", 1000, 0, 50)]).unwrap();

        assert_eq!(
            store.apply_claim("p").unwrap_err(),
            StakingError::nothing_to_claim("p")
        );
        let p = store.get("p").unwrap();
        assert_eq!(p.pending_rewards, Decimal::ZERO);
        assert_eq!(p.earned, Decimal::from(50));
    }

    #[test]
    fn test_withdrawal_clamps_at_zero() {
        let mut store = seeded();

        let withdrawn = store.apply_withdrawal("meme", Decimal::from(10_000)).unwrap();
        assert_eq!(withdrawn, Decimal::from(2800));

        let meme = store.get("meme").unwrap();
        assert_eq!(meme.total_deposited, Decimal::ZERO);
        assert_eq!(meme.pending_rewards, Decimal::ZERO);
    }

    #[test]
    fn test_partial_withdrawal() {
        let mut store = seeded();
        store.apply_withdrawal("btc", Decimal::from(1000)).unwrap();

        let btc = store.get("btc").unwrap();
        assert_eq!(btc.total_deposited, Decimal::from(2500));
        assert_eq!(
            btc.pending_rewards,
            projected_reward(Decimal::from(2500), Decimal::new(156, 1), 7).unwrap()
        );
    }

    #[test]
    fn test_list_is_stable() {
        let store = seeded();
        assert_eq!(store.list(), store.list());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = seeded();
        let duplicate = position("btc", 1, 0, 0);
        assert!(matches!(
            store.insert(duplicate),
            Err(StakingError::DuplicatePosition { .. })
        ));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_earned_never_decreases() {
        let mut store = seeded();
        let earned_before = store.get("altcoin").unwrap().earned;

        store.apply_claim("altcoin").unwrap();
        store.apply_withdrawal("altcoin", Decimal::from(100)).unwrap();
        store.apply_deposit("altcoin", Decimal::from(50)).unwrap();

        assert!(store.get("altcoin").unwrap().earned >= earned_before);
    }
}
