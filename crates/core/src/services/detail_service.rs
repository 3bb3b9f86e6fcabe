use crate::format::{
    as_currency_with_2_decimals, as_currency_with_6_decimals, formatted_with_abbreviations,
};
use crate::models::coin::Coin;
use crate::models::detail::{CoinDetail, CoinDetailStatistics};
use crate::models::statistic::StatisticEntry;

const NOT_AVAILABLE: &str = "n/a";

/// Builds the coin detail statistics from the market snapshot plus the
/// optional detail payload (block time, hashing algorithm).
pub struct DetailService;

impl DetailService {
    pub fn new() -> Self {
        Self
    }

    pub fn statistics(&self, coin: &Coin, detail: Option<&CoinDetail>) -> CoinDetailStatistics {
        CoinDetailStatistics {
            overview: self.overview(coin),
            additional: self.additional(coin, detail),
        }
    }

    fn overview(&self, coin: &Coin) -> Vec<StatisticEntry> {
        vec![
            StatisticEntry::with_change(
                "Current Price",
                as_currency_with_6_decimals(coin.current_price),
                coin.price_change_percent_24h,
            ),
            StatisticEntry::with_change(
                "Market Capitalization",
                abbreviated_dollars(coin.market_cap),
                coin.market_cap_change_percent_24h,
            ),
            StatisticEntry::new("Rank", coin.rank().to_string()),
            StatisticEntry::new("Volume", abbreviated_dollars(coin.total_volume)),
        ]
    }

    fn additional(&self, coin: &Coin, detail: Option<&CoinDetail>) -> Vec<StatisticEntry> {
        let block_time = match detail.and_then(|d| d.block_time_in_minutes) {
            None | Some(0) => NOT_AVAILABLE.to_string(),
            Some(minutes) => format!("{minutes} min"),
        };
        let hashing = detail
            .and_then(|d| d.hashing_algorithm.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        vec![
            StatisticEntry::new("24h High", or_na(coin.high_24h, as_currency_with_6_decimals)),
            StatisticEntry::new("24h Low", or_na(coin.low_24h, as_currency_with_6_decimals)),
            StatisticEntry::with_change(
                "24h Price Change",
                or_na(coin.price_change_24h, as_currency_with_2_decimals),
                coin.price_change_percent_24h,
            ),
            StatisticEntry::with_change(
                "24h Market Cap Change",
                abbreviated_dollars(coin.market_cap_change_24h),
                coin.market_cap_change_percent_24h,
            ),
            StatisticEntry::new("Block Time", block_time),
            StatisticEntry::new("Hashing Algorithm", hashing),
        ]
    }
}

impl Default for DetailService {
    fn default() -> Self {
        Self::new()
    }
}

fn or_na(value: Option<f64>, fmt: fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn abbreviated_dollars(value: Option<f64>) -> String {
    or_na(value, |v| format!("${}", formatted_with_abbreviations(v)))
}
