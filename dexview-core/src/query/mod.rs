///! Key-based query cache over the aggregator
///!
///! Memoizes aggregation results keyed by (operation, parameters), bounds
///! failures with a retry budget, revalidates stale entries in the
///! background, and warms pages ahead of navigation.

mod pager;

pub use pager::{PageSnapshot, Pager};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::aggregator::Aggregator;
use crate::error::FetchError;
use crate::types::{PageResult, PokemonDetail};

/// Cache identity: same operation and parameter values means same slot,
/// regardless of call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Page { page: u32, limit: u32 },
    Detail { id: u32 },
}

impl QueryKey {
    fn ident(&self) -> String {
        match self {
            QueryKey::Page { page, limit } => format!("page {} (limit {})", page, limit),
            QueryKey::Detail { id } => format!("detail {}", id),
        }
    }
}

#[derive(Clone)]
enum CachedValue {
    Page(PageResult),
    Detail(PokemonDetail),
}

struct CacheSlot {
    value: CachedValue,
    fetched_at: DateTime<Utc>,
    stale_at: Instant,
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// How long a cached entry is served without revalidation.
    pub stale_after: Duration,
    /// Total fetch attempts before `RetryExhausted` is surfaced.
    pub retry_attempts: u32,
    /// Base delay between attempts; scales linearly with the attempt number.
    pub retry_delay: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(5 * 60),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Caching front to the [`Aggregator`].
///
/// Cheap to clone; clones share the cache. Entry writes are last-write-wins:
/// a slot is only ever replaced whole under the write lock, so a slow
/// revalidation finishing after a newer fetch simply overwrites with
/// equivalent data for the same key and can never corrupt another key's
/// slot.
#[derive(Clone)]
pub struct QueryClient {
    aggregator: Arc<Aggregator>,
    slots: Arc<RwLock<HashMap<QueryKey, CacheSlot>>>,
    in_flight: Arc<Mutex<HashSet<QueryKey>>>,
    config: QueryConfig,
}

impl QueryClient {
    pub fn new(aggregator: Aggregator, config: QueryConfig) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            slots: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            config,
        }
    }

    /// One page of resolved records, from cache when possible.
    ///
    /// A stale hit is served immediately and revalidated in the background
    /// (stale-while-revalidate); only a miss blocks on the network.
    pub async fn page(&self, page: u32, limit: u32) -> Result<PageResult, FetchError> {
        let key = QueryKey::Page { page, limit };
        if let Some((CachedValue::Page(result), fresh)) = self.lookup(&key).await {
            if !fresh {
                self.spawn_revalidation(key);
            }
            return Ok(result);
        }

        let result = self
            .fetch_with_retry(&key.ident(), || self.aggregator.fetch_page(page, limit))
            .await?;
        self.store(key, CachedValue::Page(result.clone())).await;
        Ok(result)
    }

    /// One record plus its evolution line, from cache when possible.
    pub async fn detail(&self, id: u32) -> Result<PokemonDetail, FetchError> {
        let key = QueryKey::Detail { id };
        if let Some((CachedValue::Detail(detail), fresh)) = self.lookup(&key).await {
            if !fresh {
                self.spawn_revalidation(key);
            }
            return Ok(detail);
        }

        let detail = self
            .fetch_with_retry(&key.ident(), || self.aggregator.resolve_detail(id))
            .await?;
        self.store(key, CachedValue::Detail(detail.clone())).await;
        Ok(detail)
    }

    /// Warm the cache for a page without blocking the caller.
    ///
    /// Fire-and-forget, single attempt, no retry: a prefetch failure must
    /// never surface and is left to the normal retry path when the page is
    /// actually navigated to.
    pub fn prefetch_page(&self, page: u32, limit: u32) {
        let key = QueryKey::Page { page, limit };
        if !self.claim(&key) {
            return;
        }
        let client = self.clone();
        tokio::spawn(async move {
            if !client.is_fresh(&key).await {
                match client.aggregator.fetch_page(page, limit).await {
                    Ok(result) => client.store(key.clone(), CachedValue::Page(result)).await,
                    Err(err) => tracing::debug!("prefetch of {} failed: {}", key.ident(), err),
                }
            }
            client.release(&key);
        });
    }

    /// Whether a fresh entry exists for the key. Exposed for the pager and
    /// for tests; never triggers a fetch.
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let slots = self.slots.read().await;
        slots
            .get(key)
            .map(|slot| Instant::now() < slot.stale_at)
            .unwrap_or(false)
    }

    async fn lookup(&self, key: &QueryKey) -> Option<(CachedValue, bool)> {
        let slots = self.slots.read().await;
        slots.get(key).map(|slot| {
            let fresh = Instant::now() < slot.stale_at;
            if !fresh {
                tracing::debug!(
                    "serving stale {} fetched at {}",
                    key.ident(),
                    slot.fetched_at
                );
            }
            (slot.value.clone(), fresh)
        })
    }

    async fn store(&self, key: QueryKey, value: CachedValue) {
        let slot = CacheSlot {
            value,
            fetched_at: Utc::now(),
            stale_at: Instant::now() + self.config.stale_after,
        };
        self.slots.write().await.insert(key, slot);
    }

    /// Mark a key as having a fetch in flight. Returns false if one already
    /// is, so stale reads and prefetches cannot stampede the upstream.
    fn claim(&self, key: &QueryKey) -> bool {
        self.in_flight.lock().unwrap().insert(key.clone())
    }

    fn release(&self, key: &QueryKey) {
        self.in_flight.lock().unwrap().remove(key);
    }

    fn spawn_revalidation(&self, key: QueryKey) {
        if !self.claim(&key) {
            return;
        }
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(err) = client.refresh(&key).await {
                tracing::debug!("background revalidation of {} failed: {}", key.ident(), err);
            }
            client.release(&key);
        });
    }

    async fn refresh(&self, key: &QueryKey) -> Result<(), FetchError> {
        match *key {
            QueryKey::Page { page, limit } => {
                let result = self
                    .fetch_with_retry(&key.ident(), || self.aggregator.fetch_page(page, limit))
                    .await?;
                self.store(key.clone(), CachedValue::Page(result)).await;
            }
            QueryKey::Detail { id } => {
                let detail = self
                    .fetch_with_retry(&key.ident(), || self.aggregator.resolve_detail(id))
                    .await?;
                self.store(key.clone(), CachedValue::Detail(detail)).await;
            }
        }
        Ok(())
    }

    async fn fetch_with_retry<T, F, Fut>(&self, ident: &str, op: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts => {
                    tracing::warn!(
                        "attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        ident,
                        err
                    );
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!("{} failed after {} attempts: {}", ident, attempts, err);
                    return Err(FetchError::RetryExhausted {
                        ident: ident.to_string(),
                        attempts,
                        last: Box::new(err),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    fn client_with(fetcher: Arc<MockFetcher>, config: QueryConfig) -> QueryClient {
        QueryClient::new(Aggregator::new(fetcher), config)
    }

    fn fast_config() -> QueryConfig {
        QueryConfig {
            retry_delay: Duration::ZERO,
            ..QueryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_hit_issues_no_second_request() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        let client = client_with(fetcher.clone(), fast_config());

        let first = client.page(0, 12).await.expect("page resolves");
        let count_after_first = fetcher.call_count();
        let second = client.page(0, 12).await.expect("page resolves");

        assert_eq!(fetcher.call_count(), count_after_first);
        assert_eq!(first.results.len(), second.results.len());
        assert_eq!(first.results[0].name, second.results[0].name);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_slots() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        let client = client_with(fetcher.clone(), fast_config());

        let page0 = client.page(0, 12).await.expect("page resolves");
        let page1 = client.page(1, 12).await.expect("page resolves");
        assert_eq!(page0.results[0].name, "mon-1");
        assert_eq!(page1.results[0].name, "mon-13");
        // 2 listing calls + 24 member resolutions
        assert_eq!(fetcher.call_count(), 26);
    }

    #[tokio::test]
    async fn test_stale_hit_serves_old_value_and_revalidates_once() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        let config = QueryConfig {
            stale_after: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..QueryConfig::default()
        };
        let client = client_with(fetcher.clone(), config);

        client.page(0, 12).await.expect("page resolves");
        let listings_after_first = fetcher.calls_matching("list:");
        assert_eq!(listings_after_first, 1);

        // Entry is immediately stale: the read must still answer from cache
        // and kick off exactly one background refetch.
        let stale = client.page(0, 12).await.expect("stale value served");
        assert_eq!(stale.results.len(), 12);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.calls_matching("list:"), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        fetcher.fail_times("list:0:12", 2);
        let client = client_with(fetcher.clone(), fast_config());

        let page = client.page(0, 12).await.expect("third attempt succeeds");
        assert_eq!(page.results.len(), 12);
        assert_eq!(fetcher.calls_matching("list:"), 3);
    }

    #[tokio::test]
    async fn test_persistent_failure_surfaces_retry_exhausted_after_budget() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        fetcher.fail_on("list:0:12");
        let client = client_with(fetcher.clone(), fast_config());

        let err = client.page(0, 12).await.expect_err("budget must exhaust");
        match err {
            FetchError::RetryExhausted { attempts, last, .. } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Transport { .. }));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
        assert_eq!(fetcher.calls_matching("list:"), 3);
    }

    #[tokio::test]
    async fn test_detail_caches_by_id() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        let client = client_with(fetcher.clone(), fast_config());

        let detail = client.detail(25).await.expect("detail resolves");
        assert_eq!(detail.record.id, 25);
        let count = fetcher.call_count();

        client.detail(25).await.expect("cached detail");
        assert_eq!(fetcher.call_count(), count);
        assert!(client.is_fresh(&QueryKey::Detail { id: 25 }).await);
    }

    #[tokio::test]
    async fn test_prefetch_warms_cache_in_background() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        let client = client_with(fetcher.clone(), fast_config());

        client.prefetch_page(1, 12);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(client.is_fresh(&QueryKey::Page { page: 1, limit: 12 }).await);
        let count = fetcher.call_count();
        client.page(1, 12).await.expect("served from warm cache");
        assert_eq!(fetcher.call_count(), count);
    }

    #[tokio::test]
    async fn test_prefetch_failure_is_swallowed() {
        let fetcher = Arc::new(MockFetcher::with_universe(151));
        fetcher.fail_on("list:12:12");
        let client = client_with(fetcher.clone(), fast_config());

        client.prefetch_page(1, 12);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Single attempt, no retries, nothing cached.
        assert_eq!(fetcher.calls_matching("list:"), 1);
        assert!(!client.is_fresh(&QueryKey::Page { page: 1, limit: 12 }).await);
    }
}
