use chrono::Duration;

use crate::models::chart::{SparklineChart, Trend};
use crate::models::coin::Coin;

/// Number of days covered by the market sparkline.
pub const SPARKLINE_DAYS: i64 = 7;

/// Generates chart-ready data from a coin's 7-day sparkline.
///
/// The core computes all the numbers; the frontend only renders.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    pub fn sparkline(&self, coin: &Coin) -> SparklineChart {
        let prices = coin.sparkline_7d.clone();

        let (min, max) = if prices.is_empty() {
            (0.0, 0.0)
        } else {
            prices
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                    (lo.min(p), hi.max(p))
                })
        };

        let trend = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) if last > first => Trend::Up,
            _ => Trend::Down,
        };

        let end = coin.last_updated;
        let start = end.map(|e| e - Duration::days(SPARKLINE_DAYS));

        SparklineChart {
            prices,
            min,
            max,
            start,
            end,
            trend,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
