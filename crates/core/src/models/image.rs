use serde::{Deserialize, Serialize};

/// Composite key identifying one cached image: `(namespace, item_id)`.
///
/// Coin logos use the configured image folder as namespace and the coin id
/// as item id, e.g. `("coin_images", "bitcoin")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub namespace: String,
    pub item_id: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            item_id: item_id.into(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.item_id)
    }
}

/// Container format of a decoded image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
            ImageFormat::Gif => write!(f, "gif"),
            ImageFormat::WebP => write!(f, "webp"),
        }
    }
}

/// A decoded coin image. Rendering is left to the frontend, so the core keeps
/// the validated bytes plus whatever metadata the header exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinImage {
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Vec<u8>,
}
