use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::image::{CacheKey, CoinImage, ImageFormat};
use crate::providers::gateway::{HttpGateway, HttpRequest};
use crate::storage::image_store::ImageStore;

/// Turns raw bytes into a [`CoinImage`], or fails with `CoreError::Decode`.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<CoinImage, CoreError>;
}

/// Accepts PNG, JPEG, GIF and WebP payloads whose container structure is
/// complete: every chunk, segment or block fits, the image header carries
/// non-zero dimensions and the end marker is present. A bare signature or a
/// truncated download is a `Decode` error.
///
/// Pixel data is not decompressed; frontends render the bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerDecoder;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

impl ImageDecoder for ContainerDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<CoinImage, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Decode("Empty image payload".into()));
        }

        let (format, (width, height)) = if bytes.starts_with(PNG_SIGNATURE) {
            (ImageFormat::Png, png_dimensions(bytes)?)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            (ImageFormat::Gif, gif_dimensions(bytes)?)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            (ImageFormat::Jpeg, jpeg_dimensions(bytes)?)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            (ImageFormat::WebP, webp_dimensions(bytes)?)
        } else {
            return Err(CoreError::Decode("Unrecognised image format".into()));
        };

        if width == 0 || height == 0 {
            return Err(CoreError::Decode(format!("{format:?} image has zero size")));
        }

        Ok(CoinImage {
            format,
            width: Some(width),
            height: Some(height),
            bytes: bytes.to_vec(),
        })
    }
}

fn truncated(what: &str) -> CoreError {
    CoreError::Decode(format!("Truncated {what} image"))
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u24(bytes: &[u8], at: usize) -> u32 {
    u32::from(bytes[at]) | u32::from(bytes[at + 1]) << 8 | u32::from(bytes[at + 2]) << 16
}

/// Walk the chunk list: IHDR first, at least one IDAT, IEND last.
fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    let mut i = PNG_SIGNATURE.len();
    let mut dims = None;
    let mut has_data = false;

    loop {
        if i + 8 > bytes.len() {
            return Err(truncated("PNG"));
        }
        let len = be_u32(bytes, i) as usize;
        let kind = &bytes[i + 4..i + 8];
        let data = i + 8;
        // chunk data plus its CRC
        let next = data
            .checked_add(len)
            .and_then(|end| end.checked_add(4))
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| truncated("PNG"))?;

        match (kind, dims) {
            (b"IHDR", None) if len == 13 => {
                dims = Some((be_u32(bytes, data), be_u32(bytes, data + 4)));
            }
            (_, None) => return Err(CoreError::Decode("PNG does not start with IHDR".into())),
            (b"IDAT", Some(_)) => has_data = true,
            (b"IEND", Some(d)) => {
                return if has_data {
                    Ok(d)
                } else {
                    Err(CoreError::Decode("PNG has no image data".into()))
                };
            }
            _ => {}
        }
        i = next;
    }
}

/// Walk segments to start-of-scan; the first frame header gives the size
/// and the payload must close with end-of-image.
fn jpeg_dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    let mut i = 2;
    let mut dims = None;

    loop {
        if i + 2 > bytes.len() {
            return Err(truncated("JPEG"));
        }
        if bytes[i] != 0xFF {
            return Err(CoreError::Decode("Malformed JPEG segment".into()));
        }
        let marker = bytes[i + 1];
        // fill bytes
        if marker == 0xFF {
            i += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 4 > bytes.len() {
            return Err(truncated("JPEG"));
        }
        let len = usize::from(u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]));
        if len < 2 || i + 2 + len > bytes.len() {
            return Err(truncated("JPEG"));
        }

        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof && dims.is_none() {
            if len < 7 {
                return Err(truncated("JPEG"));
            }
            let h = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]);
            let w = u16::from_be_bytes([bytes[i + 7], bytes[i + 8]]);
            dims = Some((u32::from(w), u32::from(h)));
        }

        if marker == 0xDA {
            let d = dims.ok_or_else(|| CoreError::Decode("JPEG has no frame header".into()))?;
            return if bytes.len() >= i + 2 + len + 2 && bytes.ends_with(&[0xFF, 0xD9]) {
                Ok(d)
            } else {
                Err(truncated("JPEG"))
            };
        }
        i += 2 + len;
    }
}

/// Skip a run of GIF data sub-blocks, returning the offset after the
/// zero-length terminator.
fn skip_sub_blocks(bytes: &[u8], mut i: usize) -> Result<usize, CoreError> {
    loop {
        let size = usize::from(*bytes.get(i).ok_or_else(|| truncated("GIF"))?);
        i += 1;
        if size == 0 {
            return Ok(i);
        }
        i += size;
    }
}

fn gif_color_table_len(packed: u8) -> usize {
    if packed & 0x80 == 0 {
        0
    } else {
        3 << ((packed & 0x07) + 1)
    }
}

/// Logical screen descriptor, then blocks up to the trailer; at least one
/// image descriptor must be present.
fn gif_dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    if bytes.len() < 13 {
        return Err(truncated("GIF"));
    }
    let dims = (u32::from(le_u16(bytes, 6)), u32::from(le_u16(bytes, 8)));
    let mut i = 13 + gif_color_table_len(bytes[10]);
    let mut frames = 0usize;

    loop {
        match bytes.get(i) {
            Some(0x3B) if frames > 0 => return Ok(dims),
            Some(0x3B) => return Err(CoreError::Decode("GIF has no image data".into())),
            // extension: introducer, label, sub-blocks
            Some(0x21) => i = skip_sub_blocks(bytes, i + 2)?,
            Some(0x2C) => {
                let packed = *bytes.get(i + 9).ok_or_else(|| truncated("GIF"))?;
                // descriptor, local colour table, LZW minimum code size
                i += 10 + gif_color_table_len(packed) + 1;
                i = skip_sub_blocks(bytes, i)?;
                frames += 1;
            }
            Some(_) => return Err(CoreError::Decode("Malformed GIF block".into())),
            None => return Err(truncated("GIF")),
        }
    }
}

/// RIFF size must be covered by the payload; the first chunk is a lossy,
/// lossless or extended frame header.
fn webp_dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    if bytes.len() < 20 {
        return Err(truncated("WebP"));
    }
    let riff_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let chunk_len = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) as usize;
    if riff_len.saturating_add(8) > bytes.len() || 20usize.saturating_add(chunk_len) > bytes.len() {
        return Err(truncated("WebP"));
    }
    let data = &bytes[20..20 + chunk_len];

    match &bytes[12..16] {
        b"VP8 " if data.len() >= 10 && &data[3..6] == b"\x9D\x01\x2A" => Ok((
            u32::from(le_u16(data, 6) & 0x3FFF),
            u32::from(le_u16(data, 8) & 0x3FFF),
        )),
        b"VP8L" if data.len() >= 5 && data[0] == 0x2F => {
            let bits = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
            Ok(((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1))
        }
        b"VP8X" if data.len() >= 10 => Ok((le_u24(data, 4) + 1, le_u24(data, 7) + 1)),
        _ => Err(CoreError::Decode("Malformed WebP frame header".into())),
    }
}

/// Cache-aside resolver for coin images.
///
/// 1. Local store hit → return it; the network is not touched.
/// 2. Miss → fetch through the gateway, decode, write the bytes through to
///    the store, return the image.
/// 3. Remote or decode failure → error, nothing cached.
///
/// Local store failures are logged and treated as a miss (on load) or
/// ignored (on save). Entries are never expired or revalidated.
///
/// Concurrent resolutions of the same uncached key are not coalesced: each
/// performs its own fetch and write.
pub struct ImageCache {
    store: Arc<dyn ImageStore>,
    gateway: Arc<dyn HttpGateway>,
    decoder: Arc<dyn ImageDecoder>,
    timeout: Option<Duration>,
}

impl ImageCache {
    pub fn new(store: Arc<dyn ImageStore>, gateway: Arc<dyn HttpGateway>) -> Self {
        Self {
            store,
            gateway,
            decoder: Arc::new(ContainerDecoder),
            timeout: None,
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cache key for a coin's logo: `(namespace, coin.id)`.
    pub fn coin_key(namespace: &str, coin: &Coin) -> CacheKey {
        CacheKey::new(namespace, coin.id.as_str())
    }

    pub async fn resolve(&self, key: &CacheKey, remote_url: &str) -> Result<CoinImage, CoreError> {
        match self.store.load(key) {
            Ok(Some(bytes)) => match self.decoder.decode(&bytes) {
                Ok(image) => {
                    debug!(%key, "image cache hit");
                    return Ok(image);
                }
                Err(e) => warn!(%key, error = %e, "cached image unreadable, refetching"),
            },
            Ok(None) => debug!(%key, "image cache miss"),
            Err(e) => warn!(%key, error = %e, "image cache read failed, treating as miss"),
        }

        let mut request = HttpRequest::get(remote_url);
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }
        let bytes = self.gateway.request(&request).await?;
        let image = self.decoder.decode(&bytes)?;

        if let Err(e) = self.store.save(key, &bytes) {
            warn!(%key, error = %e, "image cache write failed");
        } else {
            debug!(%key, bytes = bytes.len(), "image cached");
        }
        Ok(image)
    }
}
