// ═══════════════════════════════════════════════════════════════════
// Service Tests — MarketService, ImageCache, DetailService, ChartService
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use coinwatch_core::errors::CoreError;
use coinwatch_core::models::chart::Trend;
use coinwatch_core::models::coin::Coin;
use coinwatch_core::models::detail::CoinDetail;
use coinwatch_core::models::image::{CacheKey, ImageFormat};
use coinwatch_core::models::market::MarketSummary;
use coinwatch_core::models::portfolio::PortfolioHolding;
use coinwatch_core::models::sort::SortOption;
use coinwatch_core::providers::gateway::{HttpGateway, HttpRequest};
use coinwatch_core::services::chart_service::ChartService;
use coinwatch_core::services::detail_service::DetailService;
use coinwatch_core::services::image_service::{ContainerDecoder, ImageCache, ImageDecoder};
use coinwatch_core::services::market_service::{
    MarketService, TITLE_BTC_DOMINANCE, TITLE_MARKET_CAP, TITLE_PORTFOLIO_VALUE, TITLE_VOLUME,
};
use coinwatch_core::storage::image_store::{ImageStore, MemoryImageStore};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════

fn bitcoin() -> Coin {
    Coin::new("bitcoin", "btc", "Bitcoin", 100.0)
        .with_rank(1)
        .with_price_change_percent(10.0)
}

fn ether() -> Coin {
    Coin::new("ethereum", "eth", "Ether", 10.0)
        .with_rank(2)
        .with_price_change_percent(-50.0)
}

fn tether() -> Coin {
    Coin::new("tether", "usdt", "Tether", 1.0).with_rank(3)
}

fn ids(coins: &[Coin]) -> Vec<&str> {
    coins.iter().map(|c| c.id.as_str()).collect()
}

/// Append a PNG chunk. The CRC is not checked, so zeros stand in.
fn png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&[0; 4]);
}

/// Smallest complete PNG layout: IHDR (32x16), one IDAT, IEND.
fn png_bytes() -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&32u32.to_be_bytes());
    ihdr.extend_from_slice(&16u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);

    let mut b = b"\x89PNG\r\n\x1a\n".to_vec();
    png_chunk(&mut b, b"IHDR", &ihdr);
    png_chunk(&mut b, b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]);
    png_chunk(&mut b, b"IEND", &[]);
    b
}

/// GIF89a, 64x48, two-entry global colour table, one frame.
fn gif_bytes() -> Vec<u8> {
    let mut b = b"GIF89a".to_vec();
    b.extend_from_slice(&64u16.to_le_bytes());
    b.extend_from_slice(&48u16.to_le_bytes());
    b.extend_from_slice(&[0x80, 0, 0]);
    b.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
    // graphic control extension
    b.extend_from_slice(&[0x21, 0xF9, 4, 0, 0, 0, 0, 0]);
    // image descriptor, LZW code size, one data sub-block, terminator
    b.push(0x2C);
    b.extend_from_slice(&[0, 0, 0, 0, 64, 0, 48, 0, 0]);
    b.extend_from_slice(&[2, 2, 0x44, 0x01, 0]);
    b.push(0x3B);
    b
}

/// Baseline JPEG, 300x200: APP0, SOF0, SOS, scan data, EOI.
fn jpeg_bytes() -> Vec<u8> {
    let mut b = vec![0xFF, 0xD8];
    b.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    b.extend_from_slice(&[0u8; 14]);
    b.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    b.extend_from_slice(&200u16.to_be_bytes());
    b.extend_from_slice(&300u16.to_be_bytes());
    b.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
    b.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    b.extend_from_slice(&[0x12, 0x34, 0x56]);
    b.extend_from_slice(&[0xFF, 0xD9]);
    b
}

/// Lossless WebP, 20x10.
fn webp_bytes() -> Vec<u8> {
    let bits: u32 = (20 - 1) | ((10 - 1) << 14);
    let mut frame = vec![0x2F];
    frame.extend_from_slice(&bits.to_le_bytes());
    frame.extend_from_slice(&[0, 0, 0]);

    let mut b = b"RIFF".to_vec();
    b.extend_from_slice(&((4 + 8 + frame.len()) as u32).to_le_bytes());
    b.extend_from_slice(b"WEBPVP8L");
    b.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    b.extend_from_slice(&frame);
    b
}

/// Gateway returning one fixed response and counting calls. An optional
/// delay keeps a fetch in flight so concurrent resolutions overlap.
struct CountingGateway {
    response: Result<Vec<u8>, CoreError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl CountingGateway {
    fn new(response: Result<Vec<u8>, CoreError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn slow(response: Result<Vec<u8>, CoreError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpGateway for CountingGateway {
    async fn request(&self, request: &HttpRequest) -> Result<Vec<u8>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// Store whose reads always fail; writes succeed and are counted.
#[derive(Default)]
struct UnreadableStore {
    saves: AtomicUsize,
}

impl ImageStore for UnreadableStore {
    fn save(&self, _key: &CacheKey, _bytes: &[u8]) -> Result<(), CoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CoreError> {
        Err(CoreError::CacheIo("permission denied".into()))
    }
}

const LOGO_URL: &str = "https://img.test/bitcoin.png";

fn key() -> CacheKey {
    CacheKey::new("coin_images", "bitcoin")
}

// ═══════════════════════════════════════════════════════════════════
// MarketService — filtering and sorting
// ═══════════════════════════════════════════════════════════════════

mod filtering_and_sorting {
    use super::*;

    #[test]
    fn search_matches_name_id_and_symbol() {
        let svc = MarketService::new();
        let coins = vec![bitcoin(), ether(), tether()];

        assert_eq!(ids(&svc.filter_coins("bit", &coins)), ["bitcoin"]);
        assert_eq!(ids(&svc.filter_coins("ETH", &coins)), ["ethereum", "tether"]);
        assert_eq!(ids(&svc.filter_coins("usdt", &coins)), ["tether"]);
        assert!(svc.filter_coins("doge", &coins).is_empty());
    }

    #[test]
    fn empty_search_passes_everything() {
        let svc = MarketService::new();
        let coins = vec![tether(), bitcoin(), ether()];
        assert_eq!(svc.filter_coins("", &coins), coins);
    }

    #[test]
    fn filter_result_is_subset_of_input() {
        let svc = MarketService::new();
        let coins = vec![bitcoin(), ether(), tether()];
        for query in ["", "e", "t", "er", "zzz", "B"] {
            let filtered = svc.filter_coins(query, &coins);
            assert!(filtered.iter().all(|c| coins.contains(c)), "{query}");
        }
    }

    #[test]
    fn sort_options_on_coin_list() {
        let svc = MarketService::new();
        let coins = vec![ether(), tether(), bitcoin()];

        let sorted = |sort| svc.filter_and_sort("", &coins, sort);
        assert_eq!(ids(&sorted(SortOption::Rank)), ["bitcoin", "ethereum", "tether"]);
        assert_eq!(ids(&sorted(SortOption::RankReversed)), ["tether", "ethereum", "bitcoin"]);
        assert_eq!(ids(&sorted(SortOption::Price)), ["bitcoin", "ethereum", "tether"]);
        assert_eq!(ids(&sorted(SortOption::PriceReversed)), ["tether", "ethereum", "bitcoin"]);
        assert_eq!(ids(&sorted(SortOption::Holdings)), ["bitcoin", "ethereum", "tether"]);
        assert_eq!(
            ids(&sorted(SortOption::HoldingsReversed)),
            ["tether", "ethereum", "bitcoin"]
        );
    }

    #[test]
    fn price_reversed_after_filter() {
        let svc = MarketService::new();
        let coins = vec![bitcoin(), ether()];
        let result = svc.filter_and_sort("", &coins, SortOption::PriceReversed);
        assert_eq!(ids(&result), ["ethereum", "bitcoin"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let svc = MarketService::new();
        for sort in SortOption::ALL {
            let mut once = vec![tether(), bitcoin(), ether()];
            svc.sort_coins(&mut once, sort);
            let mut twice = once.clone();
            svc.sort_coins(&mut twice, sort);
            assert_eq!(once, twice, "{sort}");
        }
    }

    #[test]
    fn unranked_coins_sort_first_by_rank() {
        let svc = MarketService::new();
        let mut coins = vec![bitcoin(), Coin::new("new", "new", "New", 0.1)];
        svc.sort_coins(&mut coins, SortOption::Rank);
        assert_eq!(ids(&coins), ["new", "bitcoin"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// MarketService — portfolio join and valuation
// ═══════════════════════════════════════════════════════════════════

mod portfolio {
    use super::*;

    #[test]
    fn join_keeps_only_held_coins_in_list_order() {
        let svc = MarketService::new();
        let coins = vec![bitcoin(), ether(), tether()];
        let holdings = vec![
            PortfolioHolding::new("tether", 100.0),
            PortfolioHolding::new("bitcoin", 2.0),
            PortfolioHolding::new("delisted", 5.0),
        ];

        let joined = svc.join_portfolio(&coins, &holdings);
        assert_eq!(ids(&joined), ["bitcoin", "tether"]);
        assert_eq!(joined[0].current_holdings, Some(2.0));
        assert_eq!(joined[1].current_holdings, Some(100.0));
        assert!(coins.iter().all(|c| c.current_holdings.is_none()));
    }

    #[test]
    fn joined_coins_all_have_holdings() {
        let svc = MarketService::new();
        let coins = vec![bitcoin(), ether()];
        let holdings = vec![PortfolioHolding::new("ethereum", 1.0)];
        let joined = svc.join_portfolio(&coins, &holdings);
        assert!(joined
            .iter()
            .all(|c| holdings.iter().any(|h| h.coin_id == c.id && Some(h.amount) == c.current_holdings)));
    }

    #[test]
    fn holdings_sort_by_value() {
        let svc = MarketService::new();
        let coins = vec![bitcoin().with_holdings(1.0), ether().with_holdings(50.0)];

        let desc = svc.sort_portfolio_coins(coins.clone(), SortOption::Holdings);
        assert_eq!(ids(&desc), ["ethereum", "bitcoin"]);

        let asc = svc.sort_portfolio_coins(coins.clone(), SortOption::HoldingsReversed);
        assert_eq!(ids(&asc), ["bitcoin", "ethereum"]);

        let untouched = svc.sort_portfolio_coins(coins, SortOption::Price);
        assert_eq!(ids(&untouched), ["bitcoin", "ethereum"]);
    }

    #[test]
    fn previous_value_inverts_percentage() {
        let svc = MarketService::new();
        for (current, pct) in [(110.0, 10.0), (50.0, -50.0), (1234.5, 3.7), (0.02, -99.0)] {
            let previous = svc.previous_value(current, Some(pct));
            let restored = previous * (1.0 + pct / 100.0);
            assert!((restored - current).abs() < 1e-9, "{current} {pct}");
        }
    }

    #[test]
    fn previous_value_edge_cases() {
        let svc = MarketService::new();
        assert_eq!(svc.previous_value(42.0, None), 42.0);
        assert_eq!(svc.previous_value(42.0, Some(-100.0)), 42.0);
        assert_eq!(svc.previous_value(42.0, Some(-150.0)), 42.0);
        assert_eq!(svc.previous_value(42.0, Some(0.0)), 42.0);
    }

    #[test]
    fn portfolio_value_and_change() {
        let svc = MarketService::new();
        // bitcoin: 200 now, +10% → 181.818..; ether: 100 now, -50% → 200
        let coins = vec![bitcoin().with_holdings(2.0), ether().with_holdings(10.0)];
        let current = svc.portfolio_value(&coins);
        let previous = svc.previous_portfolio_value(&coins);
        assert_eq!(current, 300.0);
        assert!((previous - (200.0 / 1.1 + 200.0)).abs() < 1e-9);

        let pct = svc.portfolio_percentage_change(current, previous).unwrap();
        assert!(pct < 0.0);
    }

    #[test]
    fn empty_portfolio_has_no_percentage() {
        let svc = MarketService::new();
        let current = svc.portfolio_value(&[]);
        let previous = svc.previous_portfolio_value(&[]);
        assert_eq!(current, 0.0);
        assert_eq!(svc.portfolio_percentage_change(current, previous), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// MarketService — statistics
// ═══════════════════════════════════════════════════════════════════

mod statistics {
    use super::*;

    fn summary() -> MarketSummary {
        MarketSummary {
            market_cap_usd: 2_900_000_000_000.0,
            volume_usd: 130_000_000_000.0,
            btc_dominance_percent: 57.123,
            market_cap_change_percent_24h_usd: -2.17,
        }
    }

    #[test]
    fn no_summary_no_statistics() {
        let svc = MarketService::new();
        assert!(svc.build_statistics(None, &[bitcoin().with_holdings(1.0)]).is_empty());
    }

    #[test]
    fn four_entries_in_order() {
        let svc = MarketService::new();
        let stats = svc.build_statistics(Some(&summary()), &[bitcoin().with_holdings(2.0)]);

        let titles: Vec<_> = stats.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            [TITLE_MARKET_CAP, TITLE_VOLUME, TITLE_BTC_DOMINANCE, TITLE_PORTFOLIO_VALUE]
        );
        assert_eq!(stats[0].value, "$2.90Tr");
        assert_eq!(stats[0].percentage_change, Some(-2.17));
        assert_eq!(stats[1].value, "$130.00Bn");
        assert_eq!(stats[1].percentage_change, None);
        assert_eq!(stats[2].value, "57.12%");
        assert_eq!(stats[3].value, "$200.00");

        let pct = stats[3].percentage_change.unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_portfolio_value_has_no_change_indicator() {
        let svc = MarketService::new();
        let stats = svc.build_statistics(Some(&summary()), &[]);
        assert_eq!(stats[3].value, "$0.00");
        assert_eq!(stats[3].percentage_change, None);
    }
}
// ═══════════════════════════════════════════════════════════════════
// ContainerDecoder
// ═══════════════════════════════════════════════════════════════════

mod decoder {
    use super::*;

    fn rejects(bytes: &[u8]) -> bool {
        matches!(ContainerDecoder.decode(bytes), Err(CoreError::Decode(_)))
    }

    #[test]
    fn png_dimensions() {
        let image = ContainerDecoder.decode(&png_bytes()).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.width, Some(32));
        assert_eq!(image.height, Some(16));
        assert_eq!(image.bytes, png_bytes());
    }

    #[test]
    fn gif_dimensions() {
        let image = ContainerDecoder.decode(&gif_bytes()).unwrap();
        assert_eq!(image.format, ImageFormat::Gif);
        assert_eq!((image.width, image.height), (Some(64), Some(48)));
    }

    #[test]
    fn jpeg_dimensions_from_sof() {
        let image = ContainerDecoder.decode(&jpeg_bytes()).unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!((image.width, image.height), (Some(300), Some(200)));
    }

    #[test]
    fn webp_lossless_dimensions() {
        let image = ContainerDecoder.decode(&webp_bytes()).unwrap();
        assert_eq!(image.format, ImageFormat::WebP);
        assert_eq!((image.width, image.height), (Some(20), Some(10)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(rejects(b""));
        assert!(rejects(b"<html>not found</html>"));
    }

    #[test]
    fn rejects_bare_signatures() {
        assert!(rejects(&[0xFF, 0xD8, 0xFF]));
        assert!(rejects(b"RIFF\x00\x00\x00\x00WEBP"));
        assert!(rejects(b"GIF89a"));
        // signature plus IHDR only, no image data or IEND
        assert!(rejects(&png_bytes()[..33]));
    }

    #[test]
    fn rejects_truncated_downloads() {
        for full in [png_bytes(), gif_bytes(), jpeg_bytes(), webp_bytes()] {
            let cut = &full[..full.len() - 1];
            assert!(rejects(cut), "accepted {} of {} bytes", cut.len(), full.len());
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        let mut gif = gif_bytes();
        gif[6] = 0;
        assert!(rejects(&gif));
    }
}


// ═══════════════════════════════════════════════════════════════════
// ImageCache
// ═══════════════════════════════════════════════════════════════════

mod image_cache {
    use super::*;

    #[tokio::test]
    async fn hit_skips_network() {
        let store = Arc::new(MemoryImageStore::new());
        store.insert(key(), png_bytes());
        let gw = CountingGateway::new(Err(CoreError::Unknown("offline".into())));
        let cache = ImageCache::new(store.clone(), gw.clone());

        let image = cache.resolve(&key(), LOGO_URL).await.unwrap();
        assert_eq!(image.bytes, png_bytes());
        assert_eq!(gw.calls(), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn miss_fetches_once_then_serves_from_store() {
        let store = Arc::new(MemoryImageStore::new());
        let gw = CountingGateway::new(Ok(png_bytes()));
        let cache = ImageCache::new(store.clone(), gw.clone());

        let first = cache.resolve(&key(), LOGO_URL).await.unwrap();
        assert_eq!(first.width, Some(32));
        assert_eq!(gw.calls(), 1);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.get(&key()), Some(png_bytes()));
        assert_eq!(gw.urls.lock().unwrap()[0], LOGO_URL);

        let second = cache.resolve(&key(), LOGO_URL).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(gw.calls(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn undecodable_download_is_not_cached() {
        let store = Arc::new(MemoryImageStore::new());
        let gw = CountingGateway::new(Ok(b"<html>404</html>".to_vec()));
        let cache = ImageCache::new(store.clone(), gw.clone());

        let err = cache.resolve(&key(), LOGO_URL).await.unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
        assert!(store.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn signature_only_download_is_not_cached() {
        let png = png_bytes();
        let payloads: [&[u8]; 3] = [
            &[0xFF, 0xD8, 0xFF],
            b"RIFF\x00\x00\x00\x00WEBP",
            &png[..24],
        ];
        for payload in payloads {
            let store = Arc::new(MemoryImageStore::new());
            let gw = CountingGateway::new(Ok(payload.to_vec()));
            let cache = ImageCache::new(store.clone(), gw.clone());

            let err = cache.resolve(&key(), LOGO_URL).await.unwrap_err();
            assert!(matches!(err, CoreError::Decode(_)), "len {}", payload.len());
            assert_eq!(store.save_count(), 0);

            // a second attempt goes back to the network instead of a cached stub
            assert!(cache.resolve(&key(), LOGO_URL).await.is_err());
            assert_eq!(gw.calls(), 2);
        }
    }

    #[tokio::test]
    async fn remote_failure_propagates() {
        let store = Arc::new(MemoryImageStore::new());
        let gw = CountingGateway::new(Err(CoreError::HttpErrorCode(404)));
        let cache = ImageCache::new(store.clone(), gw);

        assert_eq!(
            cache.resolve(&key(), LOGO_URL).await.unwrap_err(),
            CoreError::HttpErrorCode(404)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn corrupt_cached_bytes_are_refetched() {
        let store = Arc::new(MemoryImageStore::new());
        store.insert(key(), b"garbage".to_vec());
        let gw = CountingGateway::new(Ok(png_bytes()));
        let cache = ImageCache::new(store.clone(), gw.clone());

        let image = cache.resolve(&key(), LOGO_URL).await.unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(gw.calls(), 1);
        assert_eq!(store.get(&key()), Some(png_bytes()));
    }

    #[tokio::test]
    async fn unreadable_store_falls_through_to_network() {
        let store = Arc::new(UnreadableStore::default());
        let gw = CountingGateway::new(Ok(png_bytes()));
        let cache = ImageCache::new(store.clone(), gw.clone());

        assert!(cache.resolve(&key(), LOGO_URL).await.is_ok());
        assert_eq!(gw.calls(), 1);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_are_not_coalesced() {
        let store = Arc::new(MemoryImageStore::new());
        let gw = CountingGateway::slow(Ok(png_bytes()), Duration::from_millis(50));
        let cache = ImageCache::new(store.clone(), gw.clone());

        let (k1, k2) = (key(), key());
        let (a, b) = tokio::join!(cache.resolve(&k1, LOGO_URL), cache.resolve(&k2, LOGO_URL));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(gw.calls(), 2);
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn coin_key_uses_namespace_and_id() {
        assert_eq!(ImageCache::coin_key("coin_images", &bitcoin()), key());
    }
}

// ═══════════════════════════════════════════════════════════════════
// DetailService
// ═══════════════════════════════════════════════════════════════════

mod detail_service {
    use super::*;

    fn detailed_bitcoin() -> Coin {
        let mut coin = bitcoin();
        coin.market_cap = Some(1_700_000_000_000.0);
        coin.total_volume = Some(134_000_000_000.0);
        coin.high_24h = Some(86_951.0);
        coin.low_24h = Some(81_051.0);
        coin.price_change_24h = Some(-1931.02);
        coin.market_cap_change_24h = Some(-37_644_057_939.0);
        coin.market_cap_change_percent_24h = Some(-2.17);
        coin
    }

    #[test]
    fn overview_entries() {
        let stats = DetailService::new().statistics(&detailed_bitcoin(), None);
        let titles: Vec<_> = stats.overview.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Current Price", "Market Capitalization", "Rank", "Volume"]);
        assert_eq!(stats.overview[0].value, "$100.00");
        assert_eq!(stats.overview[0].percentage_change, Some(10.0));
        assert_eq!(stats.overview[1].value, "$1.70Tr");
        assert_eq!(stats.overview[2].value, "1");
        assert_eq!(stats.overview[3].value, "$134.00Bn");
    }

    #[test]
    fn additional_entries_with_detail() {
        let detail = CoinDetail {
            id: "bitcoin".into(),
            block_time_in_minutes: Some(10),
            hashing_algorithm: Some("SHA-256".into()),
            ..CoinDetail::default()
        };
        let stats = DetailService::new().statistics(&detailed_bitcoin(), Some(&detail));
        let values: Vec<_> = stats.additional.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(
            values,
            ["$86,951.00", "$81,051.00", "-$1,931.02", "$-37.64Bn","10 min", "SHA-256"]
        );
    }

    #[test]
    fn missing_fields_are_not_available() {
        let stats = DetailService::new().statistics(&Coin::new("x", "x", "X", 1.0), None);
        assert_eq!(stats.overview[1].value, "n/a");
        assert!(stats.additional.iter().all(|s| s.value == "n/a"));
    }

    #[test]
    fn zero_block_time_is_not_available() {
        let detail = CoinDetail {
            block_time_in_minutes: Some(0),
            ..CoinDetail::default()
        };
        let stats = DetailService::new().statistics(&bitcoin(), Some(&detail));
        assert_eq!(stats.additional[4].value, "n/a");
    }
}

// ═══════════════════════════════════════════════════════════════════
// ChartService
// ═══════════════════════════════════════════════════════════════════

mod chart_service {
    use super::*;

    #[test]
    fn bounds_trend_and_range() {
        let mut coin = bitcoin();
        coin.sparkline_7d = vec![50.0, 40.0, 70.0, 60.0];
        coin.last_updated = Some(Utc.with_ymd_and_hms(2025, 11, 22, 0, 0, 0).unwrap());

        let chart = ChartService::new().sparkline(&coin);
        assert_eq!(chart.min, 40.0);
        assert_eq!(chart.max, 70.0);
        assert_eq!(chart.trend, Trend::Up);
        assert_eq!(chart.end, coin.last_updated);
        assert_eq!(chart.start, Some(Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap()));
    }

    #[test]
    fn falling_series_trends_down() {
        let mut coin = bitcoin();
        coin.sparkline_7d = vec![70.0, 40.0];
        assert_eq!(ChartService::new().sparkline(&coin).trend, Trend::Down);
    }

    #[test]
    fn empty_series() {
        let chart = ChartService::new().sparkline(&bitcoin());
        assert!(chart.prices.is_empty());
        assert_eq!((chart.min, chart.max), (0.0, 0.0));
        assert_eq!(chart.trend, Trend::Down);
        assert_eq!(chart.start, None);
    }
}
