use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioHolding;

use super::manager::StorageManager;

/// Where committed holdings are persisted.
pub trait HoldingsBackend: Send + Sync {
    fn load(&self) -> Result<Vec<PortfolioHolding>, CoreError>;
    fn persist(&self, holdings: &[PortfolioHolding]) -> Result<(), CoreError>;
}

impl<T: HoldingsBackend + ?Sized> HoldingsBackend for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<PortfolioHolding>, CoreError> {
        (**self).load()
    }

    fn persist(&self, holdings: &[PortfolioHolding]) -> Result<(), CoreError> {
        (**self).persist(holdings)
    }
}

/// Volatile backend for tests and previews. Counts persisted writes.
#[derive(Default)]
pub struct MemoryBackend {
    saved: Mutex<Vec<PortfolioHolding>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holdings(holdings: Vec<PortfolioHolding>) -> Self {
        Self {
            saved: Mutex::new(holdings),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl HoldingsBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<PortfolioHolding>, CoreError> {
        Ok(self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn persist(&self, holdings: &[PortfolioHolding]) -> Result<(), CoreError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = holdings.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend writing the portfolio file format to one path on disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HoldingsBackend for FileBackend {
    fn load(&self) -> Result<Vec<PortfolioHolding>, CoreError> {
        StorageManager::load_from_file(&self.path)
    }

    fn persist(&self, holdings: &[PortfolioHolding]) -> Result<(), CoreError> {
        StorageManager::save_to_file(holdings, &self.path)
    }
}

/// Owner of the user's holdings `{coin_id → amount}`.
///
/// Every write is persisted before it is committed in memory, and every
/// committed state is published to subscribers synchronously, before
/// `upsert`/`remove` return.
///
/// Invariants: at most one holding per coin id, amounts always `> 0`.
pub struct PortfolioStore {
    backend: Box<dyn HoldingsBackend>,
    holdings: Mutex<Vec<PortfolioHolding>>,
    tx: watch::Sender<Vec<PortfolioHolding>>,
}

impl std::fmt::Debug for PortfolioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioStore")
            .field("holdings", &self.list().len())
            .finish()
    }
}

impl PortfolioStore {
    /// Load the persisted holdings and start publishing them.
    ///
    /// Records that violate the invariants (duplicate ids, non-positive
    /// amounts) are dropped on load; the first record for an id wins.
    pub fn open(backend: impl HoldingsBackend + 'static) -> Result<Self, CoreError> {
        let mut holdings: Vec<PortfolioHolding> = Vec::new();
        for h in backend.load()? {
            if h.amount > 0.0 && h.amount.is_finite() && !holdings.iter().any(|x| x.coin_id == h.coin_id) {
                holdings.push(h);
            }
        }
        let (tx, _rx) = watch::channel(holdings.clone());
        Ok(Self {
            backend: Box::new(backend),
            holdings: Mutex::new(holdings),
            tx,
        })
    }

    pub fn in_memory() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            backend: Box::new(MemoryBackend::new()),
            holdings: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::open(FileBackend::new(path))
    }

    /// All holdings in creation order.
    pub fn list(&self) -> Vec<PortfolioHolding> {
        self.holdings.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get(&self, coin_id: &str) -> Option<PortfolioHolding> {
        self.holdings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|h| h.coin_id == coin_id)
            .cloned()
    }

    /// Receiver that observes every committed holdings state.
    pub fn subscribe(&self) -> watch::Receiver<Vec<PortfolioHolding>> {
        self.tx.subscribe()
    }

    /// Create, update or delete the holding for `coin_id`.
    ///
    /// - `amount > 0` and no record → create
    /// - `amount > 0` and a record → update in place
    /// - `amount <= 0` → delete (no-op when there is no record)
    pub fn upsert(&self, coin_id: &str, amount: f64) -> Result<(), CoreError> {
        if coin_id.trim().is_empty() {
            return Err(CoreError::ValidationError("Coin id must not be empty".into()));
        }
        if !amount.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Holding amount must be finite, got {amount}"
            )));
        }

        let mut guard = self.holdings.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        let existing = next.iter().position(|h| h.coin_id == coin_id);

        match (existing, amount > 0.0) {
            (Some(idx), true) => next[idx].amount = amount,
            (Some(idx), false) => {
                next.remove(idx);
            }
            (None, true) => next.push(PortfolioHolding::new(coin_id, amount)),
            (None, false) => return Ok(()),
        }

        self.commit(&mut guard, next)?;
        debug!(coin_id, amount, "holding updated");
        Ok(())
    }

    /// Delete the holding for `coin_id`. Returns whether one existed.
    pub fn remove(&self, coin_id: &str) -> Result<bool, CoreError> {
        let mut guard = self.holdings.lock().unwrap_or_else(|e| e.into_inner());
        let Some(idx) = guard.iter().position(|h| h.coin_id == coin_id) else {
            return Ok(false);
        };
        let mut next = guard.clone();
        next.remove(idx);
        self.commit(&mut guard, next)?;
        Ok(true)
    }

    /// Persist first; memory and subscribers only see the new state once the
    /// backend accepted it.
    fn commit(
        &self,
        current: &mut Vec<PortfolioHolding>,
        next: Vec<PortfolioHolding>,
    ) -> Result<(), CoreError> {
        self.backend.persist(&next)?;
        *current = next.clone();
        self.tx.send_replace(next);
        Ok(())
    }
}
