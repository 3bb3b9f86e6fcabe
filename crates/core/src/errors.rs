use thiserror::Error;

/// Unified error type for the entire coinwatch-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Network ─────────────────────────────────────────────────────
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response statusCode: {0}")]
    InvalidResponse(u16),

    #[error("HTTP error code: {0}")]
    HttpErrorCode(u16),

    #[error("Unknown error: {0}")]
    Unknown(String),

    // ── Payloads ────────────────────────────────────────────────────
    #[error("Decode error: {0}")]
    Decode(String),

    // ── Local storage ───────────────────────────────────────────────
    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// True for failures that came from the remote side (transport or status),
    /// as opposed to local storage or decoding problems.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidUrl(_)
                | CoreError::InvalidResponse(_)
                | CoreError::HttpErrorCode(_)
                | CoreError::Unknown(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::CacheIo(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Unknown(redact_query(&e.to_string()))
    }
}

/// Strip query parameters from anything that looks like a URL so that
/// credentials passed as query strings never reach logs or the UI.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
