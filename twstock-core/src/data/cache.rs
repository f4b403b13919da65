//! Read-through TTL cache.
//!
//! Entries expire a fixed duration after insertion. Expiry is checked on read
//! against an injectable `Clock`, so tests can advance time without sleeping.
//! The cache is the only shared mutable state in the data layer and sits
//! behind a `Mutex`; the lock is never held while a loader runs.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

use super::provider::{DataError, DataSource, PriceSource};
use crate::domain::PriceBar;

/// Default lifetime of a cached price history.
pub const HISTORY_TTL: Duration = Duration::from_secs(10 * 60);

/// Default lifetime of the market reference book.
pub const REFERENCE_TTL: Duration = Duration::from_secs(60 * 60);

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
}

/// Key-value cache with a single time-to-live for every entry.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, (Instant, V)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any. Expired entries are evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((stored_at, value)) if now.duration_since(*stored_at) < self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` and drop every entry that has already expired, so keys
    /// that are never read again do not accumulate.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, (stored_at, _)| now.duration_since(*stored_at) < ttl);
        entries.insert(key, (now, value));
    }

    /// Return the cached value or run `load`, caching only successes.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = load()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `PriceSource` wrapper that serves repeated requests from a `TtlCache`.
pub struct CachedSource<S> {
    inner: S,
    cache: TtlCache<(String, NaiveDate), Arc<Vec<PriceBar>>>,
}

impl<S: PriceSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn with_clock(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached history for `symbol`.
    pub fn invalidate(&self, symbol: &str) {
        self.cache.entries.lock().unwrap().retain(|(s, _), _| s != symbol);
    }
}

impl<S: PriceSource> PriceSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> DataSource {
        self.inner.kind()
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError> {
        let key = (symbol.to_string(), start);
        if let Some(bars) = self.cache.get(&key) {
            debug!(symbol, %start, "price cache hit");
            return Ok(bars.as_ref().clone());
        }
        debug!(symbol, %start, source = self.inner.name(), "price cache miss");
        let bars = Arc::new(self.inner.fetch(symbol, start)?);
        self.cache.insert(key, Arc::clone(&bars));
        Ok(bars.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl PriceSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn kind(&self) -> DataSource {
            DataSource::Synthetic
        }

        fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "missing" {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.into(),
                });
            }
            Ok(vec![PriceBar::new(start, 10.0, 11.0, 9.0, 10.5)])
        }
    }

    fn counting() -> CountingSource {
        CountingSource {
            calls: AtomicUsize::new(0),
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<&str, u32> =
            TtlCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.insert("a", 1);

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&"a"), Some(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_purges_expired_keys() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<&str, u32> =
            TtlCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.insert("a", 1);
        cache.insert("b", 2);

        clock.advance(Duration::from_secs(30));
        cache.insert("c", 3);
        assert_eq!(cache.len(), 3);

        clock.advance(Duration::from_secs(30));
        cache.insert("d", 4);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn cached_source_forgets_stale_start_dates() {
        let clock = Arc::new(ManualClock::new());
        let source = CachedSource::with_clock(counting(), HISTORY_TTL, clock.clone());
        for day in 0..5 {
            source
                .fetch("2330", start() + chrono::Duration::days(day))
                .unwrap();
            clock.advance(HISTORY_TTL);
        }
        assert_eq!(source.cache.len(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::from_secs(60));
        let err: Result<u8, &str> = cache.get_or_try_insert_with(1, || Err("boom"));
        assert!(err.is_err());
        assert!(cache.is_empty());
        let first: Result<u8, &str> = cache.get_or_try_insert_with(1, || Ok(7));
        let second: Result<u8, &str> = cache.get_or_try_insert_with(1, || Ok(9));
        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[test]
    fn cached_source_reads_through_once_per_ttl() {
        let clock = Arc::new(ManualClock::new());
        let source = CachedSource::with_clock(counting(), HISTORY_TTL, clock.clone());

        source.fetch("2330", start()).unwrap();
        source.fetch("2330", start()).unwrap();
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);

        clock.advance(HISTORY_TTL);
        source.fetch("2330", start()).unwrap();
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_source_retries_failures() {
        let source = CachedSource::new(counting(), HISTORY_TTL);
        assert!(source.fetch("missing", start()).is_err());
        assert!(source.fetch("missing", start()).is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let source = CachedSource::new(counting(), HISTORY_TTL);
        source.fetch("2330", start()).unwrap();
        source.invalidate("2330");
        source.fetch("2330", start()).unwrap();
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }
}
