//! Reward projection math
//!
//! Pure functions only. Rewards are simple (non-compounding) interest on the
//! principal, pro-rated over the lock period.

use rust_decimal::Decimal;

use crate::error::{Result, StakingError};

pub const DAYS_PER_YEAR: u32 = 365;

/// `principal * (apy_percent / 100) * (period_days / 365)`
///
/// Terms are not validated here; see [`validate_terms`]. A projection that
/// does not fit in a `Decimal` is an `InvalidAmount` for the principal.
pub fn projected_reward(
    principal: Decimal,
    apy_percent: Decimal,
    period_days: u32,
) -> Result<Decimal> {
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }

    // dividing by 100 first is exact and keeps the product in range
    principal
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|p| p.checked_mul(apy_percent))
        .and_then(|p| p.checked_mul(Decimal::from(period_days)))
        .and_then(|p| p.checked_div(Decimal::from(DAYS_PER_YEAR)))
        .ok_or(StakingError::InvalidAmount { amount: principal })
}

/// Reject terms that would make a projection meaningless
pub fn validate_terms(apy: Decimal, lock_days: u32) -> Result<()> {
    if apy < Decimal::ZERO {
        return Err(StakingError::InvalidApy { apy });
    }
    if lock_days == 0 {
        return Err(StakingError::InvalidLockPeriod);
    }
    Ok(())
}

/// Amount left after a flat fee, floored at zero
pub fn net_of_fee(amount: Decimal, fee: Decimal) -> Decimal {
    (amount - fee).max(Decimal::ZERO)
}
