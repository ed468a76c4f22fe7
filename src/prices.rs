// USD price quotes from CoinGecko. Quote failures never propagate: the
// cache degrades to its last good data (or an empty map) so a flaky quote
// API cannot break balance display.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::tokens;

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(30);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinGecko id -> USD price; None when the API had no quote for the id.
pub type PriceMap = HashMap<String, Option<f64>>;

#[derive(Default)]
struct CacheState {
    data: PriceMap,
    fetched_at: Option<Instant>,
}

// One lock guards the whole read-check-fetch-write sequence so concurrent
// misses cannot tear the data/timestamp pair or race duplicate fetches.
#[derive(Default)]
pub struct PriceCache {
    state: Mutex<CacheState>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_all(&self, http: &reqwest::Client) -> PriceMap {
        self.get_all_with(|| fetch_all_prices(http)).await
    }

    async fn get_all_with<F, Fut>(&self, fetch: F) -> PriceMap
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<PriceMap>>,
    {
        let mut state = self.state.lock().await;
        if let Some(at) = state.fetched_at
            && at.elapsed() < FRESHNESS_WINDOW
            && !state.data.is_empty()
        {
            return state.data.clone();
        }
        match fetch().await {
            Ok(data) => {
                state.data = data.clone();
                state.fetched_at = Some(Instant::now());
                data
            }
            Err(e) => {
                debug!(error = %e, "price fetch failed, serving stale cache");
                state.data.clone()
            }
        }
    }
}

async fn fetch_all_prices(http: &reqwest::Client) -> anyhow::Result<PriceMap> {
    let ids = tokens::coingecko_ids().join(",");
    let url = format!("{COINGECKO_URL}?ids={ids}&vs_currencies=usd");
    let body: HashMap<String, HashMap<String, f64>> = http
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body
        .into_iter()
        .map(|(id, quote)| (id, quote.get("usd").copied()))
        .collect())
}

// Uncached single-id quote for low-traffic paths. Any failure is None.
pub async fn fetch_usd_price(http: &reqwest::Client, coingecko_id: Option<&str>) -> Option<f64> {
    let id = coingecko_id?;
    let url = format!("{COINGECKO_URL}?ids={id}&vs_currencies=usd");
    let body: HashMap<String, HashMap<String, f64>> = http
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .json()
        .await
        .ok()?;
    body.get(id)?.get("usd").copied()
}

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("icw/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quotes(pairs: &[(&str, f64)]) -> PriceMap {
        pairs
            .iter()
            .map(|(id, p)| (id.to_string(), Some(*p)))
            .collect()
    }

    #[tokio::test]
    async fn second_call_within_window_hits_the_cache() {
        let cache = PriceCache::new();
        let fetches = AtomicUsize::new(0);

        let first = cache
            .get_all_with(|| async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(quotes(&[("bitcoin", 50_000.0)]))
            })
            .await;
        let second = cache
            .get_all_with(|| async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(quotes(&[("bitcoin", 99_999.0)]))
            })
            .await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(second["bitcoin"], Some(50_000.0));
    }

    #[tokio::test]
    async fn failure_falls_back_to_stale_data() {
        let cache = PriceCache::new();
        let seeded = cache
            .get_all_with(|| async { Ok(quotes(&[("ethereum", 3_000.0)])) })
            .await;
        assert_eq!(seeded["ethereum"], Some(3_000.0));

        // Age the cache past the window, then fail the refetch.
        tokio::time::pause();
        tokio::time::advance(FRESHNESS_WINDOW + Duration::from_secs(1)).await;
        let stale = cache
            .get_all_with(|| async { Err(anyhow!("rate limited")) })
            .await;
        assert_eq!(stale["ethereum"], Some(3_000.0));
    }

    #[tokio::test]
    async fn failure_with_no_cache_is_empty_not_an_error() {
        let cache = PriceCache::new();
        let result = cache
            .get_all_with(|| async { Err(anyhow!("network down")) })
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn expired_cache_is_refetched() {
        let cache = PriceCache::new();
        cache
            .get_all_with(|| async { Ok(quotes(&[("bitcoin", 1.0)])) })
            .await;

        tokio::time::pause();
        tokio::time::advance(FRESHNESS_WINDOW + Duration::from_secs(1)).await;
        let refreshed = cache
            .get_all_with(|| async { Ok(quotes(&[("bitcoin", 2.0)])) })
            .await;
        assert_eq!(refreshed["bitcoin"], Some(2.0));
    }

    #[tokio::test]
    async fn missing_quote_is_recorded_as_absent() {
        let cache = PriceCache::new();
        let data = cache
            .get_all_with(|| async {
                let mut map = PriceMap::new();
                map.insert("bitcoin".to_string(), Some(50_000.0));
                map.insert("some-unlisted-token".to_string(), None);
                Ok(map)
            })
            .await;
        assert_eq!(data["some-unlisted-token"], None);
    }
}
