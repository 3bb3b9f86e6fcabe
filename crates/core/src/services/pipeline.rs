use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::market::MarketSummary;
use crate::models::portfolio::PortfolioHolding;
use crate::models::sort::SortOption;
use crate::models::statistic::StatisticEntry;
use crate::providers::traits::{CoinListSource, MarketSummarySource};
use crate::services::market_service::MarketService;
use crate::storage::portfolio_store::PortfolioStore;

/// Quiet window applied to search/sort/coin-list changes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Derived state consumed by the home screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    /// Filtered and sorted master list.
    pub coins: Vec<Coin>,
    /// Coins present in the portfolio, carrying `current_holdings`.
    pub portfolio_coins: Vec<Coin>,
    pub statistics: Vec<StatisticEntry>,
    pub market_summary: Option<MarketSummary>,
    /// True while any triggered fetch has not resolved yet.
    pub is_loading: bool,
    /// Latest fetch failure since the last reload, if any.
    pub error_message: Option<String>,
    pub search_text: String,
    pub sort_option: SortOption,
    /// Number of reloads the owner task has started (startup included).
    pub reloads_started: u64,
    /// Search and sort commands the owner task has taken in.
    pub inputs_applied: u64,
    /// A search, sort or coin-list change is still inside the quiet window.
    pub recompute_pending: bool,
}

enum Command {
    Reload,
    SetSearchText(String),
    SetSortOption(SortOption),
}

enum FetchOutcome {
    Coins(Result<Vec<Coin>, CoreError>),
    Market(Result<Option<MarketSummary>, CoreError>),
}

/// The reactive aggregation pipeline.
///
/// Combines the coin list and market summary sources, the portfolio store
/// and the user's search/sort input into [`HomeState`]. All derived state is
/// owned by one task; fetches run on spawned tasks and hand their results
/// back over a channel in completion order (last delivered wins).
pub struct MarketPipeline {
    coin_source: Arc<dyn CoinListSource>,
    market_source: Arc<dyn MarketSummarySource>,
    portfolio: Arc<PortfolioStore>,
    debounce: Duration,
    sort_option: SortOption,
}

impl MarketPipeline {
    pub fn new(
        coin_source: Arc<dyn CoinListSource>,
        market_source: Arc<dyn MarketSummarySource>,
        portfolio: Arc<PortfolioStore>,
    ) -> Self {
        Self {
            coin_source,
            market_source,
            portfolio,
            debounce: DEFAULT_DEBOUNCE,
            sort_option: SortOption::default(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_sort_option(mut self, sort_option: SortOption) -> Self {
        self.sort_option = sort_option;
        self
    }

    /// Start the owner task on the current tokio runtime and trigger the
    /// startup reload. The task stops once every handle has been dropped.
    pub fn spawn(self) -> PipelineHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let holdings_rx = self.portfolio.subscribe();
        let holdings = holdings_rx.borrow().clone();

        let initial = HomeState {
            sort_option: self.sort_option,
            recompute_pending: true,
            ..HomeState::default()
        };
        let (state_tx, state_rx) = watch::channel(initial);

        let worker = Worker {
            coin_source: self.coin_source,
            market_source: self.market_source,
            debounce: self.debounce,
            service: MarketService::new(),
            raw_coins: Vec::new(),
            market: None,
            holdings,
            search_text: String::new(),
            sort_option: self.sort_option,
            coins: Vec::new(),
            portfolio_coins: Vec::new(),
            statistics: Vec::new(),
            pending_fetches: 0,
            reloads_started: 0,
            inputs_applied: 0,
            recompute_pending: true,
            error_message: None,
            result_tx,
            state_tx,
        };
        tokio::spawn(worker.run(command_rx, result_rx, holdings_rx));

        PipelineHandle {
            commands: command_tx,
            state: state_rx,
            portfolio: self.portfolio,
            reloads_requested: Arc::new(AtomicU64::new(1)),
            inputs_requested: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Cloneable front door to a running pipeline.
#[derive(Clone)]
pub struct PipelineHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<HomeState>,
    portfolio: Arc<PortfolioStore>,
    reloads_requested: Arc<AtomicU64>,
    inputs_requested: Arc<AtomicU64>,
}

impl PipelineHandle {
    /// Fetch the coin list and market summary again. Earlier fetches still
    /// in flight are not cancelled.
    pub fn reload(&self) {
        self.reloads_requested.fetch_add(1, Ordering::SeqCst);
        self.send(Command::Reload);
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.inputs_requested.fetch_add(1, Ordering::SeqCst);
        self.send(Command::SetSearchText(text.into()));
    }

    pub fn set_sort_option(&self, sort_option: SortOption) {
        self.inputs_requested.fetch_add(1, Ordering::SeqCst);
        self.send(Command::SetSortOption(sort_option));
    }

    /// Write through the portfolio store; the pipeline picks the change up
    /// from the store's notification.
    pub fn update_holding(&self, coin_id: &str, amount: f64) -> Result<(), CoreError> {
        self.portfolio.upsert(coin_id, amount)
    }

    /// Snapshot of the current derived state.
    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.clone()
    }

    pub fn portfolio(&self) -> &Arc<PortfolioStore> {
        &self.portfolio
    }

    /// Wait until every reload requested through this handle (or its clones)
    /// has started and all fetches have resolved.
    pub async fn wait_until_idle(&self) -> Result<HomeState, CoreError> {
        let requested = self.reloads_requested.load(Ordering::SeqCst);
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| s.reloads_started >= requested && !s.is_loading)
            .await
            .map_err(|_| CoreError::Unknown("Pipeline stopped".into()))?;
        Ok(state.clone())
    }

    /// Like [`wait_until_idle`](Self::wait_until_idle), and additionally
    /// wait for the debounced recompute covering every search/sort change
    /// sent through this handle, so `coins` reflects the latest input.
    pub async fn wait_until_settled(&self) -> Result<HomeState, CoreError> {
        let reloads = self.reloads_requested.load(Ordering::SeqCst);
        let inputs = self.inputs_requested.load(Ordering::SeqCst);
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| {
                s.reloads_started >= reloads
                    && s.inputs_applied >= inputs
                    && !s.is_loading
                    && !s.recompute_pending
            })
            .await
            .map_err(|_| CoreError::Unknown("Pipeline stopped".into()))?;
        Ok(state.clone())
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("pipeline stopped, command dropped");
        }
    }
}

/// Owner task state. Only `run` mutates it, so no locking is needed.
struct Worker {
    coin_source: Arc<dyn CoinListSource>,
    market_source: Arc<dyn MarketSummarySource>,
    debounce: Duration,
    service: MarketService,

    // inputs
    raw_coins: Vec<Coin>,
    market: Option<MarketSummary>,
    holdings: Vec<PortfolioHolding>,
    search_text: String,
    sort_option: SortOption,

    // outputs
    coins: Vec<Coin>,
    portfolio_coins: Vec<Coin>,
    statistics: Vec<StatisticEntry>,

    pending_fetches: usize,
    reloads_started: u64,
    inputs_applied: u64,
    recompute_pending: bool,
    error_message: Option<String>,

    result_tx: mpsc::UnboundedSender<FetchOutcome>,
    state_tx: watch::Sender<HomeState>,
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<FetchOutcome>,
        mut holdings_rx: watch::Receiver<Vec<PortfolioHolding>>,
    ) {
        self.start_reload();

        // Trailing-edge debounce over (raw coins, search text, sort option).
        // Armed at startup so the initial combination is emitted too.
        let debounce = tokio::time::sleep(self.debounce);
        tokio::pin!(debounce);
        let mut holdings_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("all pipeline handles dropped, stopping");
                        break;
                    };
                    match command {
                        Command::Reload => self.start_reload(),
                        Command::SetSearchText(text) => {
                            self.search_text = text;
                            self.inputs_applied += 1;
                            debounce.as_mut().reset(Instant::now() + self.debounce);
                            self.recompute_pending = true;
                        }
                        Command::SetSortOption(sort_option) => {
                            self.sort_option = sort_option;
                            self.inputs_applied += 1;
                            debounce.as_mut().reset(Instant::now() + self.debounce);
                            self.recompute_pending = true;
                        }
                    }
                    self.publish();
                }
                Some(outcome) = results.recv() => {
                    self.pending_fetches = self.pending_fetches.saturating_sub(1);
                    if self.apply_outcome(outcome) {
                        debounce.as_mut().reset(Instant::now() + self.debounce);
                        self.recompute_pending = true;
                    }
                    self.publish();
                }
                changed = holdings_rx.changed(), if holdings_open => {
                    match changed {
                        Ok(()) => {
                            self.holdings = holdings_rx.borrow_and_update().clone();
                            debug!(holdings = self.holdings.len(), "holdings changed");
                            self.recompute_portfolio();
                            self.publish();
                        }
                        Err(_) => holdings_open = false,
                    }
                }
                () = &mut debounce, if self.recompute_pending => {
                    self.recompute_pending = false;
                    self.recompute_coins();
                    self.publish();
                }
            }
        }
    }

    /// Trigger one coin-list fetch and one market-summary fetch.
    fn start_reload(&mut self) {
        self.reloads_started += 1;
        self.pending_fetches += 2;
        self.error_message = None;
        info!(generation = self.reloads_started, "reloading market data");

        let source = Arc::clone(&self.coin_source);
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(async move { source.fetch_coins().await }).await {
                Ok(result) => result,
                Err(e) => Err(CoreError::Unknown(format!("Coin list task failed: {e}"))),
            };
            let _ = tx.send(FetchOutcome::Coins(result));
        });

        let source = Arc::clone(&self.market_source);
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(async move { source.fetch_market_summary().await }).await {
                Ok(result) => result,
                Err(e) => Err(CoreError::Unknown(format!("Market data task failed: {e}"))),
            };
            let _ = tx.send(FetchOutcome::Market(result));
        });

        self.publish();
    }

    /// Merge one fetch result. Failures keep the last good value.
    /// Returns true when the raw coin list changed (debounce input).
    fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Coins(Ok(coins)) => {
                debug!(count = coins.len(), "coin list delivered");
                self.raw_coins = coins;
                true
            }
            FetchOutcome::Coins(Err(e)) => {
                warn!(error = %e, "coin list fetch failed");
                self.error_message = Some(format!("Failed to load coins: {e}"));
                false
            }
            FetchOutcome::Market(Ok(summary)) => {
                debug!(present = summary.is_some(), "market summary delivered");
                self.market = summary;
                self.recompute_statistics();
                false
            }
            FetchOutcome::Market(Err(e)) => {
                warn!(error = %e, "market summary fetch failed");
                self.error_message = Some(format!("Failed to load market data: {e}"));
                false
            }
        }
    }

    fn recompute_coins(&mut self) {
        self.coins = self
            .service
            .filter_and_sort(&self.search_text, &self.raw_coins, self.sort_option);
        debug!(
            coins = self.coins.len(),
            search = %self.search_text,
            sort = %self.sort_option,
            "coin list recomputed"
        );
        self.recompute_portfolio();
    }

    fn recompute_portfolio(&mut self) {
        let joined = self.service.join_portfolio(&self.coins, &self.holdings);
        self.portfolio_coins = self.service.sort_portfolio_coins(joined, self.sort_option);
        self.recompute_statistics();
    }

    fn recompute_statistics(&mut self) {
        self.statistics = self
            .service
            .build_statistics(self.market.as_ref(), &self.portfolio_coins);
    }

    fn publish(&self) {
        self.state_tx.send_replace(HomeState {
            coins: self.coins.clone(),
            portfolio_coins: self.portfolio_coins.clone(),
            statistics: self.statistics.clone(),
            market_summary: self.market,
            is_loading: self.pending_fetches > 0,
            error_message: self.error_message.clone(),
            search_text: self.search_text.clone(),
            sort_option: self.sort_option,
            reloads_started: self.reloads_started,
            inputs_applied: self.inputs_applied,
            recompute_pending: self.recompute_pending,
        });
    }
}
