//! Core ledger types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reward_math;

/// One user's stake in one named pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingPosition {
    id: String,
    pub name: String,
    pub total_deposited: Decimal,
    pub apy: Decimal,
    pub lock_days: u32,
    pub pending_rewards: Decimal,
    pub earned: Decimal,
}

impl StakingPosition {
    /// Create a fresh position with no principal and no reward history
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        apy: Decimal,
        lock_days: u32,
    ) -> Result<Self> {
        reward_math::validate_terms(apy, lock_days)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            total_deposited: Decimal::ZERO,
            apy,
            lock_days,
            pending_rewards: Decimal::ZERO,
            earned: Decimal::ZERO,
        })
    }

    /// Seed balances for an existing position
    pub fn with_balances(
        mut self,
        total_deposited: Decimal,
        pending_rewards: Decimal,
        earned: Decimal,
    ) -> Self {
        self.total_deposited = total_deposited.max(Decimal::ZERO);
        self.pending_rewards = pending_rewards.max(Decimal::ZERO);
        self.earned = earned.max(Decimal::ZERO);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reward projected for the current principal over one lock period
    pub fn projected_reward(&self) -> Result<Decimal> {
        reward_math::projected_reward(self.total_deposited, self.apy, self.lock_days)
    }

    pub fn has_claimable_rewards(&self) -> bool {
        self.pending_rewards > Decimal::ZERO
    }
}

/// Portfolio totals shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_staked: Decimal,
    pub total_pending_rewards: Decimal,
    pub total_earned: Decimal,
    pub average_apy: Decimal,
    pub position_count: usize,
}

impl PortfolioSummary {
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a StakingPosition>) -> Self {
        let mut summary = PortfolioSummary {
            total_staked: Decimal::ZERO,
            total_pending_rewards: Decimal::ZERO,
            total_earned: Decimal::ZERO,
            average_apy: Decimal::ZERO,
            position_count: 0,
        };
        let mut apy_sum = Decimal::ZERO;

        for position in positions {
            summary.total_staked += position.total_deposited;
            summary.total_pending_rewards += position.pending_rewards;
            summary.total_earned += position.earned;
            apy_sum += position.apy;
            summary.position_count += 1;
        }

        if summary.position_count > 0 {
            summary.average_apy = apy_sum / Decimal::from(summary.position_count as u64);
        }
        summary
    }
}

/// What a claim would pay out after the estimated network fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuote {
    pub position_id: String,
    pub pending_rewards: Decimal,
    pub estimated_gas_fee: Decimal,
    pub net_rewards: Decimal,
}
