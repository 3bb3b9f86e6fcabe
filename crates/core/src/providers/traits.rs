use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::detail::CoinDetail;
use crate::models::market::MarketSummary;

/// Ranked market snapshot (the master coin list).
///
/// One request per call; no retry. Callers retry by triggering a reload.
#[async_trait]
pub trait CoinListSource: Send + Sync {
    async fn fetch_coins(&self) -> Result<Vec<Coin>, CoreError>;
}

/// Global market statistics. `Ok(None)` means the remote returned no data
/// envelope.
#[async_trait]
pub trait MarketSummarySource: Send + Sync {
    async fn fetch_market_summary(&self) -> Result<Option<MarketSummary>, CoreError>;
}

/// Per-coin detail (description, links, chain parameters).
#[async_trait]
pub trait CoinDetailSource: Send + Sync {
    async fn fetch_coin_detail(&self, coin_id: &str) -> Result<CoinDetail, CoreError>;
}
