use serde::{Deserialize, Serialize};

/// A user-declared quantity of one coin.
///
/// The portfolio store guarantees at most one holding per `coin_id` and never
/// stores a non-positive amount (an update to `<= 0` deletes the record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    pub coin_id: String,
    pub amount: f64,
}

impl PortfolioHolding {
    pub fn new(coin_id: impl Into<String>, amount: f64) -> Self {
        Self {
            coin_id: coin_id.into(),
            amount,
        }
    }
}
