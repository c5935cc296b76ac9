//! Starting set of staking positions

use rust_decimal::Decimal;

use crate::error::Result;
use crate::types::StakingPosition;

/// Positions every fresh ledger starts with, in display order
pub fn create_seed_positions() -> Result<Vec<StakingPosition>> {
    Ok(vec![
        StakingPosition::new("altcoin", "Altcoin Staking", Decimal::new(125, 1), 3)?
            .with_balances(
                Decimal::new(508965, 2),
                Decimal::new(569752, 2),
                Decimal::new(189201, 2),
            ),
        StakingPosition::new("btc", "BTC Staking", Decimal::new(156, 1), 7)?
            .with_balances(
                Decimal::new(350000, 2),
                Decimal::new(420000, 2),
                Decimal::new(189201, 2),
            ),
        StakingPosition::new("meme", "Meme Staking", Decimal::new(156, 1), 14)?
            .with_balances(
                Decimal::new(280000, 2),
                Decimal::new(336000, 2),
                Decimal::new(189201, 2),
            ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_positions() {
        let positions = create_seed_positions().unwrap();
        let ids: Vec<&str> = positions.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["altcoin", "btc", "meme"]);

        let btc = &positions[1];
        assert_eq!(btc.total_deposited, Decimal::from(3500));
        assert_eq!(btc.apy, Decimal::new(156, 1));
        assert_eq!(btc.lock_days, 7);
    }
}
