use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::image::CacheKey;

/// Byte store for cached images. No TTL, no size bound, no eviction.
///
/// Calls are synchronous and run on the calling task.
pub trait ImageStore: Send + Sync {
    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CoreError>;
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CoreError>;
}

/// Reject key components that could escape their slot (empty, separators,
/// `.`/`..`), so each key maps to exactly one file under the root.
pub fn validate_key(key: &CacheKey) -> Result<(), CoreError> {
    for part in [&key.namespace, &key.item_id] {
        let bad = part.is_empty()
            || part == "."
            || part == ".."
            || part.contains(['/', '\\', '\0']);
        if bad {
            return Err(CoreError::CacheIo(format!("Invalid cache key: {key}")));
        }
    }
    Ok(())
}

/// Stores each image at `<root>/<namespace>/<item_id>.img`.
pub struct FileImageStore {
    root: PathBuf,
}

impl FileImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> Result<PathBuf, CoreError> {
        validate_key(key)?;
        Ok(self
            .root
            .join(&key.namespace)
            .join(format!("{}.img", key.item_id)))
    }
}

impl ImageStore for FileImageStore {
    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        if let Some(folder) = path.parent() {
            std::fs::create_dir_all(folder)?;
        }
        std::fs::write(&path, bytes)?;
        Ok(())
    }

    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Counts calls so tests can assert cache behaviour.
#[derive(Default)]
pub struct MemoryImageStore {
    entries: Mutex<HashMap<CacheKey, Vec<u8>>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without counting it as a save.
    pub fn insert(&self, key: CacheKey, bytes: Vec<u8>) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, bytes);
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ImageStore for MemoryImageStore {
    fn save(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CoreError> {
        validate_key(key)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CoreError> {
        validate_key(key)?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(key))
    }
}
