use std::path::Path;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioHolding;

use super::format;

/// Save/load portfolio holdings to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Flow: holdings → bincode → portfolio file bytes
    pub fn save_to_bytes(holdings: &[PortfolioHolding]) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(holdings)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize holdings: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Flow: file bytes → parse header → bincode → holdings
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<PortfolioHolding>, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize holdings: {e}")))
    }

    /// Write holdings to disk. The file is written next to the target and
    /// renamed into place so a crash never leaves a half-written portfolio.
    pub fn save_to_file(holdings: &[PortfolioHolding], path: &Path) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(holdings)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read holdings from disk. A missing file is an empty portfolio.
    pub fn load_from_file(path: &Path) -> Result<Vec<PortfolioHolding>, CoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::load_from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
