pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use errors::CoreError;
use models::{
    chart::SparklineChart,
    coin::Coin,
    detail::CoinDetailStatistics,
    image::CoinImage,
    settings::Settings,
};
use providers::{
    coingecko::CoinGeckoProvider,
    gateway::{HttpGateway, ReqwestGateway},
    traits::CoinDetailSource,
};
use services::{
    chart_service::ChartService,
    detail_service::DetailService,
    image_service::ImageCache,
    pipeline::{MarketPipeline, PipelineHandle},
};
use storage::{image_store::ImageStore, portfolio_store::PortfolioStore};

/// Main entry point for the coinwatch core library.
///
/// Wires the CoinGecko provider, the portfolio store and the image cache
/// together, and starts the aggregation pipeline on demand. Every
/// collaborator is injected, so tests substitute doubles at any seam.
#[must_use]
pub struct CoinWatch {
    settings: Settings,
    provider: Arc<CoinGeckoProvider>,
    portfolio: Arc<PortfolioStore>,
    image_cache: ImageCache,
    detail_service: DetailService,
    chart_service: ChartService,
}

impl std::fmt::Debug for CoinWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinWatch")
            .field("base_url", &self.settings.base_url)
            .field("api_key", &self.settings.api_key.as_ref().map(|_| "<redacted>"))
            .field("holdings", &self.portfolio.list().len())
            .finish()
    }
}

impl CoinWatch {
    /// Build with the production `reqwest` gateway.
    pub fn new(
        settings: Settings,
        portfolio: PortfolioStore,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self::with_gateway(settings, Arc::new(ReqwestGateway::new()), portfolio, image_store)
    }

    /// Build with an explicit gateway (shared by the market sources and the
    /// image cache).
    pub fn with_gateway(
        settings: Settings,
        gateway: Arc<dyn HttpGateway>,
        portfolio: PortfolioStore,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        let provider = Arc::new(CoinGeckoProvider::new(Arc::clone(&gateway), settings.clone()));
        let image_cache =
            ImageCache::new(image_store, gateway).with_timeout(settings.request_timeout());
        Self {
            settings,
            provider,
            portfolio: Arc::new(portfolio),
            image_cache,
            detail_service: DetailService::new(),
            chart_service: ChartService::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn portfolio(&self) -> &Arc<PortfolioStore> {
        &self.portfolio
    }

    /// Spawn the aggregation pipeline (must be called inside a tokio runtime).
    /// It performs the startup reload immediately.
    pub fn start_pipeline(&self) -> PipelineHandle {
        MarketPipeline::new(
            self.provider.clone(),
            self.provider.clone(),
            Arc::clone(&self.portfolio),
        )
        .with_debounce(self.settings.search_debounce())
        .spawn()
    }

    /// Resolve a coin's logo through the image cache.
    pub async fn coin_image(&self, coin: &Coin) -> Result<CoinImage, CoreError> {
        let key = ImageCache::coin_key(&self.settings.image_folder, coin);
        self.image_cache.resolve(&key, &coin.image_url).await
    }

    /// Fetch the coin's detail payload and build the detail statistics.
    pub async fn coin_detail_statistics(&self, coin: &Coin) -> Result<CoinDetailStatistics, CoreError> {
        let detail = self.provider.fetch_coin_detail(&coin.id).await?;
        Ok(self.detail_service.statistics(coin, Some(&detail)))
    }

    /// Chart data for the coin's 7-day sparkline.
    #[must_use]
    pub fn sparkline(&self, coin: &Coin) -> SparklineChart {
        self.chart_service.sparkline(coin)
    }
}
