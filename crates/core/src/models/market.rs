use serde::{Deserialize, Serialize};

/// Global market statistics from `/global`, replaced wholesale on every
/// successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub market_cap_usd: f64,
    pub volume_usd: f64,
    pub btc_dominance_percent: f64,
    pub market_cap_change_percent_24h_usd: f64,
}
