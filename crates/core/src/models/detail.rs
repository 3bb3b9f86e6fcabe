use serde::{Deserialize, Serialize};

/// Extra per-coin information from `/coins/{id}`, flattened from the
/// nested remote payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub block_time_in_minutes: Option<u32>,
    pub hashing_algorithm: Option<String>,
    /// English description, if the project provides one.
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    pub subreddit_url: Option<String>,
}

/// Statistics shown on the coin detail screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinDetailStatistics {
    pub overview: Vec<super::statistic::StatisticEntry>,
    pub additional: Vec<super::statistic::StatisticEntry>,
}
