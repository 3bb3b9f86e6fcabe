use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::gateway::{HttpGateway, HttpRequest};
use super::traits::{CoinDetailSource, CoinListSource, MarketSummarySource};
use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::detail::CoinDetail;
use crate::models::market::MarketSummary;
use crate::models::settings::Settings;

/// Header carrying the demo API key.
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko API provider for the coin list, global stats and coin detail.
///
/// - **Endpoints**: `/coins/markets`, `/global`, `/coins/{id}`
/// - **Auth**: optional static demo key sent as a header.
///
/// All requests go through the injected [`HttpGateway`], so tests swap the
/// transport for a mock without touching this code.
pub struct CoinGeckoProvider {
    gateway: Arc<dyn HttpGateway>,
    settings: Settings,
}

impl CoinGeckoProvider {
    pub fn new(gateway: Arc<dyn HttpGateway>, settings: Settings) -> Self {
        Self { gateway, settings }
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    pub fn coins_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&price_change_percentage=24h&order=market_cap_desc&per_page={}&page=1&sparkline=true",
            self.base_url(),
            self.settings.vs_currency,
            self.settings.per_page,
        )
    }

    pub fn global_url(&self) -> String {
        format!("{}/global", self.base_url())
    }

    pub fn detail_url(&self, coin_id: &str) -> String {
        format!("{}/coins/{coin_id}", self.base_url())
    }

    fn build_request(&self, url: String) -> HttpRequest {
        let request = HttpRequest::get(url).with_timeout(self.settings.request_timeout());
        match &self.settings.api_key {
            Some(key) => request.with_header(API_KEY_HEADER, key.clone()),
            None => request,
        }
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct GlobalResponse {
    #[serde(default)]
    data: Option<GlobalData>,
}

#[derive(Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
    market_cap_change_percentage_24h_usd: Option<f64>,
}

impl GlobalData {
    fn into_summary(self) -> Result<MarketSummary, CoreError> {
        let missing = |field: &str| CoreError::Decode(format!("Global data is missing {field}"));
        Ok(MarketSummary {
            market_cap_usd: *self
                .total_market_cap
                .get("usd")
                .ok_or_else(|| missing("total_market_cap.usd"))?,
            volume_usd: *self
                .total_volume
                .get("usd")
                .ok_or_else(|| missing("total_volume.usd"))?,
            btc_dominance_percent: *self
                .market_cap_percentage
                .get("btc")
                .ok_or_else(|| missing("market_cap_percentage.btc"))?,
            market_cap_change_percent_24h_usd: self
                .market_cap_change_percentage_24h_usd
                .ok_or_else(|| missing("market_cap_change_percentage_24h_usd"))?,
        })
    }
}

#[derive(Deserialize)]
struct DetailResponse {
    id: String,
    symbol: String,
    name: String,
    block_time_in_minutes: Option<u32>,
    hashing_algorithm: Option<String>,
    description: Option<DetailDescription>,
    links: Option<DetailLinks>,
}

#[derive(Deserialize)]
struct DetailDescription {
    en: Option<String>,
}

#[derive(Deserialize)]
struct DetailLinks {
    homepage: Option<Vec<String>>,
    subreddit_url: Option<String>,
}

impl From<DetailResponse> for CoinDetail {
    fn from(r: DetailResponse) -> Self {
        let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };
        let (homepage_url, subreddit_url) = match r.links {
            Some(links) => (
                links
                    .homepage
                    .unwrap_or_default()
                    .into_iter()
                    .find(|u| !u.trim().is_empty()),
                links.subreddit_url.and_then(non_empty),
            ),
            None => (None, None),
        };
        CoinDetail {
            id: r.id,
            symbol: r.symbol,
            name: r.name,
            block_time_in_minutes: r.block_time_in_minutes,
            hashing_algorithm: r.hashing_algorithm.and_then(non_empty),
            description: r.description.and_then(|d| d.en).and_then(non_empty),
            homepage_url,
            subreddit_url,
        }
    }
}

/// Coin ids are URL path segments; only slug characters are allowed.
fn validate_coin_id(coin_id: &str) -> Result<(), CoreError> {
    let valid = !coin_id.is_empty()
        && coin_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!("Invalid coin id: {coin_id:?}")))
    }
}

#[async_trait]
impl CoinListSource for CoinGeckoProvider {
    async fn fetch_coins(&self) -> Result<Vec<Coin>, CoreError> {
        let body = self.gateway.request(&self.build_request(self.coins_url())).await?;
        let coins: Vec<Coin> = serde_json::from_slice(&body)
            .map_err(|e| CoreError::Decode(format!("Failed to parse coin list: {e}")))?;
        debug!(count = coins.len(), "decoded coin list");
        Ok(coins)
    }
}

#[async_trait]
impl MarketSummarySource for CoinGeckoProvider {
    async fn fetch_market_summary(&self) -> Result<Option<MarketSummary>, CoreError> {
        let body = self.gateway.request(&self.build_request(self.global_url())).await?;
        let resp: GlobalResponse = serde_json::from_slice(&body)
            .map_err(|e| CoreError::Decode(format!("Failed to parse global data: {e}")))?;
        resp.data.map(GlobalData::into_summary).transpose()
    }
}

#[async_trait]
impl CoinDetailSource for CoinGeckoProvider {
    async fn fetch_coin_detail(&self, coin_id: &str) -> Result<CoinDetail, CoreError> {
        validate_coin_id(coin_id)?;
        let body = self
            .gateway
            .request(&self.build_request(self.detail_url(coin_id)))
            .await?;
        let resp: DetailResponse = serde_json::from_slice(&body)
            .map_err(|e| CoreError::Decode(format!("Failed to parse detail for {coin_id}: {e}")))?;
        Ok(resp.into())
    }
}
