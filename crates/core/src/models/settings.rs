use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Runtime configuration for the market sources, image cache and pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Demo API key sent as `x-cg-demo-api-key`. The header is omitted when unset.
    pub api_key: Option<String>,

    /// Base URL of the market data API, without trailing slash.
    pub base_url: String,

    /// Quote currency for the coin list (e.g. "usd").
    pub vs_currency: String,

    /// Number of coins requested per page.
    pub per_page: u32,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Namespace used for coin logo cache keys.
    pub image_folder: String,

    /// Quiet window before search/sort changes are applied.
    pub search_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            vs_currency: "usd".to_string(),
            per_page: 250,
            request_timeout_secs: 120,
            image_folder: "coin_images".to_string(),
            search_debounce_ms: 500,
        }
    }
}

impl Settings {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}
