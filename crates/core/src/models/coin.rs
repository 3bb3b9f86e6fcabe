use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market snapshot of one tracked coin, as returned by `/coins/markets`.
///
/// `id` is the identity key used everywhere (joins with portfolio holdings,
/// image cache keys). Only the fields the app consumes are decoded.
///
/// `current_holdings` is never part of the remote payload. It is attached by
/// the portfolio join via [`Coin::with_holdings`], which returns a new value
/// instead of mutating a shared snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,

    #[serde(rename = "image")]
    pub image_url: String,

    pub current_price: f64,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_24h: Option<f64>,

    #[serde(rename = "price_change_percentage_24h")]
    pub price_change_percent_24h: Option<f64>,

    pub market_cap_change_24h: Option<f64>,

    #[serde(rename = "market_cap_change_percentage_24h")]
    pub market_cap_change_percent_24h: Option<f64>,

    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub ath: Option<f64>,
    pub ath_date: Option<DateTime<Utc>>,
    pub atl: Option<f64>,
    pub atl_date: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,

    /// 7-day price series (`sparkline_in_7d.price`). Empty when absent.
    #[serde(rename = "sparkline_in_7d", default, with = "sparkline_prices")]
    pub sparkline_7d: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_holdings: Option<f64>,
}

impl Coin {
    /// Minimal snapshot with every optional market field unset.
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        current_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image_url: String::new(),
            current_price,
            market_cap: None,
            market_cap_rank: None,
            total_volume: None,
            high_24h: None,
            low_24h: None,
            price_change_24h: None,
            price_change_percent_24h: None,
            market_cap_change_24h: None,
            market_cap_change_percent_24h: None,
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            ath: None,
            ath_date: None,
            atl: None,
            atl_date: None,
            last_updated: None,
            sparkline_7d: Vec::new(),
            current_holdings: None,
        }
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.market_cap_rank = Some(f64::from(rank));
        self
    }

    pub fn with_price_change_percent(mut self, pct: f64) -> Self {
        self.price_change_percent_24h = Some(pct);
        self
    }

    /// Return a copy of this coin carrying `amount` as its current holdings.
    #[must_use]
    pub fn with_holdings(&self, amount: f64) -> Self {
        Self {
            current_holdings: Some(amount),
            ..self.clone()
        }
    }

    /// Market-cap rank; coins without a rank sort as rank 0.
    pub fn rank(&self) -> u32 {
        match self.market_cap_rank {
            Some(rank) if rank.is_finite() && rank > 0.0 => rank as u32,
            _ => 0,
        }
    }

    /// `current_price × current_holdings`, zero when no holdings are attached.
    pub fn current_holding_value(&self) -> f64 {
        self.current_price * self.current_holdings.unwrap_or(0.0)
    }
}

/// `sparkline_in_7d` arrives as `{"price": [..]}` or `null`.
mod sparkline_prices {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Wire {
        #[serde(default)]
        price: Option<Vec<f64>>,
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire: Option<Wire> = Option::deserialize(deserializer)?;
        Ok(wire.and_then(|w| w.price).unwrap_or_default())
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S>(prices: &Vec<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Wire {
            price: Some(prices.clone()),
        }
        .serialize(serializer)
    }
}
