use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PositionValuation;

/// Flattened valuation of one position, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub nft_token_id: U256,
    pub network: String,
    pub token0_symbol: String,
    pub token1_symbol: String,
    pub price0: f64,
    pub price1: f64,
    pub liquidity0_amount: f64,
    pub liquidity1_amount: f64,
    pub liquidity_in_usd: f64,
    pub fee0_amount: f64,
    pub fee1_amount: f64,
    pub fee_in_usd: f64,
    pub total_usd: f64,
}

impl PositionReport {
    pub fn new(network: &str, valuation: &PositionValuation) -> Self {
        Self {
            nft_token_id: valuation.position.token_id,
            network: network.to_string(),
            token0_symbol: valuation.tokens.token0.symbol.clone(),
            token1_symbol: valuation.tokens.token1.symbol.clone(),
            price0: valuation.prices.token0,
            price1: valuation.prices.token1,
            liquidity0_amount: valuation.liquidity.token0,
            liquidity1_amount: valuation.liquidity.token1,
            liquidity_in_usd: valuation.liquidity.usd(),
            fee0_amount: valuation.fees.token0,
            fee1_amount: valuation.fees.token1,
            fee_in_usd: valuation.fees.usd(),
            total_usd: valuation.total_usd(),
        }
    }
}

/// Subtotals for one network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    pub network: String,
    pub positions: usize,
    pub fee_in_usd: f64,
    pub locked_in_usd: f64,
    pub balance_in_usd: f64,
}

/// Everything tracked for one owner across all networks at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingReport {
    pub owner: Address,
    pub generated_at: DateTime<Utc>,
    pub positions: Vec<PositionReport>,
    pub networks: Vec<NetworkReport>,
    pub total_fee_in_usd: f64,
    pub total_locked_in_usd: f64,
    /// Fees plus locked liquidity
    pub total_awaited_in_usd: f64,
    pub total_balance_in_usd: f64,
}

impl TrackingReport {
    pub fn new(owner: Address, positions: Vec<PositionReport>, networks: Vec<NetworkReport>) -> Self {
        let total_fee_in_usd = networks.iter().map(|n| n.fee_in_usd).sum::<f64>();
        let total_locked_in_usd = networks.iter().map(|n| n.locked_in_usd).sum::<f64>();
        let total_balance_in_usd = networks.iter().map(|n| n.balance_in_usd).sum::<f64>();

        Self {
            owner,
            generated_at: Utc::now(),
            positions,
            networks,
            total_fee_in_usd,
            total_locked_in_usd,
            total_awaited_in_usd: total_fee_in_usd + total_locked_in_usd,
            total_balance_in_usd,
        }
    }

    /// Awaited value plus wallet balances.
    pub fn total_usd(&self) -> f64 {
        self.total_awaited_in_usd + self.total_balance_in_usd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(name: &str, fee: f64, locked: f64, balance: f64) -> NetworkReport {
        NetworkReport {
            network: name.to_string(),
            positions: 1,
            fee_in_usd: fee,
            locked_in_usd: locked,
            balance_in_usd: balance,
        }
    }

    #[test]
    fn test_totals_aggregate_networks() {
        let report = TrackingReport::new(
            Address::ZERO,
            Vec::new(),
            vec![network("L1", 10.0, 1000.0, 50.0), network("L2", 5.0, 500.0, 25.0)],
        );

        assert_eq!(report.total_fee_in_usd, 15.0);
        assert_eq!(report.total_locked_in_usd, 1500.0);
        assert_eq!(report.total_awaited_in_usd, 1515.0);
        assert_eq!(report.total_balance_in_usd, 75.0);
        assert_eq!(report.total_usd(), 1590.0);
    }

    #[test]
    fn test_empty_report() {
        let report = TrackingReport::new(Address::ZERO, Vec::new(), Vec::new());
        assert_eq!(report.total_usd(), 0.0);
    }
}
