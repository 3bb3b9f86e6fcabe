use std::path::PathBuf;

use coinwatch_core::models::settings::Settings;
use coinwatch_core::models::sort::SortOption;

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub cache_dir: PathBuf,
    pub portfolio_file: PathBuf,
    pub search_text: String,
    pub sort_option: SortOption,
    pub rows: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // .env never overrides variables already present in the environment
        dotenvy::dotenv().ok();

        let mut settings = Settings::default();
        if let Ok(key) = std::env::var("COINGECKO_API_KEY") {
            if !key.trim().is_empty() {
                settings.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("COINGECKO_BASE_URL") {
            settings.base_url = url;
        }

        let cache_dir = std::env::var("COINWATCH_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("coinwatch"));
        let portfolio_file = std::env::var("COINWATCH_PORTFOLIO_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| cache_dir.join("portfolio.cwpf"));

        let search_text = std::env::var("COINWATCH_SEARCH").unwrap_or_default();
        let sort_option = match std::env::var("COINWATCH_SORT") {
            Ok(s) => s.parse()?,
            Err(_) => SortOption::Rank,
        };
        let rows = std::env::var("COINWATCH_ROWS")
            .ok()
            .and_then(|r| r.parse().ok())
            .unwrap_or(20);

        Ok(Self {
            settings,
            cache_dir,
            portfolio_file,
            search_text,
            sort_option,
            rows,
        })
    }
}
