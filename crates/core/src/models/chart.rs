use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of the 7-day sparkline (last price vs first price).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// Chart-ready view of a coin's 7-day sparkline.
///
/// The core computes the bounds and date range; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparklineChart {
    pub prices: Vec<f64>,
    pub min: f64,
    pub max: f64,
    /// `end - 7 days`, absent when the coin has no `last_updated`.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub trend: Trend,
}

impl SparklineChart {
    /// Y positions in `[0, 1]` (0 = min, 1 = max). A flat series maps to 0.5.
    pub fn normalized(&self) -> Vec<f64> {
        let range = self.max - self.min;
        if range <= 0.0 || !range.is_finite() {
            return vec![0.5; self.prices.len()];
        }
        self.prices
            .iter()
            .map(|p| (p - self.min) / range)
            .collect()
    }
}
