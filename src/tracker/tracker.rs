use alloy::primitives::Address;
use futures::{future, future::try_join_all, TryStreamExt};
use log::info;

use crate::{
    chain::{parse_address, NetworkConnection},
    config::TrackerSettings,
    error::Result,
    models::{NetworkReport, PositionReport, PositionValuation, TrackingReport},
    tracker::{discover, fetch_assets_balance_in_usd, MetadataCache, PositionValuator, UsdQuoter},
};

/// Entry point for valuing everything an owner holds across networks.
///
/// Holds the process-wide [`MetadataCache`]; build one `Tracker` at startup
/// and share it between requests.
#[derive(Clone)]
pub struct Tracker {
    quoter: UsdQuoter,
    valuator: PositionValuator,
    settings: TrackerSettings,
}

impl Tracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self::with_cache(MetadataCache::new(), settings)
    }

    pub fn with_cache(cache: MetadataCache, settings: TrackerSettings) -> Self {
        let quoter = UsdQuoter::new(cache);
        Self {
            valuator: PositionValuator::new(quoter.clone()),
            quoter,
            settings,
        }
    }

    pub fn cache(&self) -> &MetadataCache {
        self.quoter.cache()
    }

    /// Value every position with liquidity and every tracked wallet balance
    /// of `owner` on each network.
    ///
    /// Networks are processed concurrently. Any failure aborts the whole
    /// request; no partial report is produced.
    pub async fn track_positions(&self, networks: &[NetworkConnection], owner: &str) -> Result<TrackingReport> {
        let owner = parse_address(owner)?;

        let per_network = try_join_all(networks.iter().map(|network| self.track_network(network, owner))).await?;

        let (positions, subtotals): (Vec<_>, Vec<_>) = per_network.into_iter().unzip();
        let positions = positions.into_iter().flatten().collect();

        Ok(TrackingReport::new(owner, positions, subtotals))
    }

    async fn track_network(
        &self,
        network: &NetworkConnection,
        owner: Address,
    ) -> Result<(Vec<PositionReport>, NetworkReport)> {
        let (valuations, balance_in_usd) = tokio::try_join!(
            self.value_positions(network, owner),
            fetch_assets_balance_in_usd(network, &self.quoter, owner, self.settings.quote_fee_tier)
        )?;

        let positions: Vec<PositionReport> = valuations
            .iter()
            .map(|valuation| PositionReport::new(&network.name, valuation))
            .collect();

        let subtotal = NetworkReport {
            network: network.name.clone(),
            positions: positions.len(),
            fee_in_usd: positions.iter().map(|p| p.fee_in_usd).sum(),
            locked_in_usd: positions.iter().map(|p| p.liquidity_in_usd).sum(),
            balance_in_usd,
        };

        info!(
            "{}: {} active positions, ${:.2} locked, ${:.2} fees, ${:.2} balance",
            network.name, subtotal.positions, subtotal.locked_in_usd, subtotal.fee_in_usd, balance_in_usd
        );

        Ok((positions, subtotal))
    }

    /// Positions with zero liquidity are skipped. Valuation of a position
    /// starts as soon as discovery yields it.
    async fn value_positions(&self, network: &NetworkConnection, owner: Address) -> Result<Vec<PositionValuation>> {
        let valuator = &self.valuator;

        discover(network, owner)
            .try_filter(|position| future::ready(position.liquidity > 0))
            .map_ok(move |position| async move { valuator.value(network, &position).await })
            .try_buffered(self.settings.max_concurrent_positions.max(1))
            .try_collect()
            .await
    }
}
