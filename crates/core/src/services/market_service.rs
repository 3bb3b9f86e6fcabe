use std::collections::HashMap;

use crate::format::{as_currency_with_2_decimals, as_percent_string, formatted_with_abbreviations};
use crate::models::coin::Coin;
use crate::models::market::MarketSummary;
use crate::models::portfolio::PortfolioHolding;
use crate::models::sort::SortOption;
use crate::models::statistic::StatisticEntry;

pub const TITLE_MARKET_CAP: &str = "Market Cap";
pub const TITLE_VOLUME: &str = "24h Volume";
pub const TITLE_BTC_DOMINANCE: &str = "BTC Dominance";
pub const TITLE_PORTFOLIO_VALUE: &str = "Portfolio Value";

/// Filtering, sorting, portfolio join and statistics for the home screen.
///
/// Pure business logic with no I/O and no timers. The pipeline calls into this on
/// its owner task; tests call it directly.
pub struct MarketService;

impl MarketService {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive substring match on name, id and symbol.
    /// An empty search returns the list unchanged.
    pub fn filter_coins(&self, search_text: &str, coins: &[Coin]) -> Vec<Coin> {
        if search_text.is_empty() {
            return coins.to_vec();
        }
        let needle = search_text.to_lowercase();
        coins
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.id.to_lowercase().contains(&needle)
                    || c.symbol.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Order the full coin list. `Holdings*` share the rank orderings here,
    /// since only the portfolio list has a holdings order of its own.
    /// Sorts are stable, so ties keep their incoming order.
    pub fn sort_coins(&self, coins: &mut [Coin], sort: SortOption) {
        match sort {
            SortOption::Rank | SortOption::Holdings => coins.sort_by_key(|c| c.rank()),
            SortOption::RankReversed | SortOption::HoldingsReversed => {
                coins.sort_by(|a, b| b.rank().cmp(&a.rank()))
            }
            SortOption::Price => {
                coins.sort_by(|a, b| b.current_price.total_cmp(&a.current_price))
            }
            SortOption::PriceReversed => {
                coins.sort_by(|a, b| a.current_price.total_cmp(&b.current_price))
            }
        }
    }

    pub fn filter_and_sort(&self, search_text: &str, coins: &[Coin], sort: SortOption) -> Vec<Coin> {
        let mut filtered = self.filter_coins(search_text, coins);
        self.sort_coins(&mut filtered, sort);
        filtered
    }

    /// Coins that have a matching holding, each carrying its amount, in the
    /// order of `coins`. Holdings without a matching coin are ignored.
    pub fn join_portfolio(&self, coins: &[Coin], holdings: &[PortfolioHolding]) -> Vec<Coin> {
        let amounts: HashMap<&str, f64> = holdings
            .iter()
            .map(|h| (h.coin_id.as_str(), h.amount))
            .collect();
        coins
            .iter()
            .filter_map(|coin| amounts.get(coin.id.as_str()).map(|&a| coin.with_holdings(a)))
            .collect()
    }

    /// `Holdings` → largest holding value first, `HoldingsReversed` → smallest
    /// first; every other option keeps the join order.
    pub fn sort_portfolio_coins(&self, mut coins: Vec<Coin>, sort: SortOption) -> Vec<Coin> {
        match sort {
            SortOption::Holdings => coins.sort_by(|a, b| {
                b.current_holding_value()
                    .total_cmp(&a.current_holding_value())
            }),
            SortOption::HoldingsReversed => coins.sort_by(|a, b| {
                a.current_holding_value()
                    .total_cmp(&b.current_holding_value())
            }),
            _ => {}
        }
        coins
    }

    /// Sum of `current_price × current_holdings`.
    pub fn portfolio_value(&self, coins: &[Coin]) -> f64 {
        coins.iter().map(Coin::current_holding_value).sum()
    }

    /// Value 24h ago, recovered by inverting the 24h percentage change:
    /// `current / (1 + pct/100)`.
    ///
    /// - no percentage → no change, previous equals current
    /// - pct ≤ −100 → cannot be inverted, previous equals current
    pub fn previous_value(&self, current_value: f64, price_change_percent_24h: Option<f64>) -> f64 {
        let Some(pct) = price_change_percent_24h else {
            return current_value;
        };
        let factor = 1.0 + pct / 100.0;
        if factor <= 0.0 || !factor.is_finite() {
            return current_value;
        }
        current_value / factor
    }

    pub fn previous_portfolio_value(&self, coins: &[Coin]) -> f64 {
        coins
            .iter()
            .map(|c| self.previous_value(c.current_holding_value(), c.price_change_percent_24h))
            .sum()
    }

    /// `(current − previous) / previous × 100`, or `None` when `previous` is
    /// zero (empty portfolio) or the result is not finite.
    pub fn portfolio_percentage_change(&self, current: f64, previous: f64) -> Option<f64> {
        if previous == 0.0 {
            return None;
        }
        let pct = (current - previous) / previous * 100.0;
        pct.is_finite().then_some(pct)
    }

    /// Market cap, 24h volume, BTC dominance and portfolio value.
    /// Empty until a market summary is available.
    pub fn build_statistics(
        &self,
        summary: Option<&MarketSummary>,
        portfolio_coins: &[Coin],
    ) -> Vec<StatisticEntry> {
        let Some(data) = summary else {
            return Vec::new();
        };

        let current = self.portfolio_value(portfolio_coins);
        let previous = self.previous_portfolio_value(portfolio_coins);

        vec![
            StatisticEntry::with_change(
                TITLE_MARKET_CAP,
                format!("${}", formatted_with_abbreviations(data.market_cap_usd)),
                Some(data.market_cap_change_percent_24h_usd),
            ),
            StatisticEntry::new(
                TITLE_VOLUME,
                format!("${}", formatted_with_abbreviations(data.volume_usd)),
            ),
            StatisticEntry::new(TITLE_BTC_DOMINANCE, as_percent_string(data.btc_dominance_percent)),
            StatisticEntry::with_change(
                TITLE_PORTFOLIO_VALUE,
                as_currency_with_2_decimals(current),
                self.portfolio_percentage_change(current, previous),
            ),
        ]
    }
}

impl Default for MarketService {
    fn default() -> Self {
        Self::new()
    }
}
