//! Catalog query cache
//!
//! Resolves a `QueryKey` into a `CatalogPage`, talking to the
//! [`CatalogSource`] only when it has to:
//!
//! - a fresh resolved entry is served without a request;
//! - concurrent requests for the same key share one in-flight fetch
//!   (the coalescing map holds a `Shared` future per key);
//! - revalidation refetches resolved data while keeping it visible;
//! - a fetch whose callers all went away is dropped, and its key is
//!   released as if it had never been requested;
//! - when more than `capacity` keys are cached, the least recently accessed
//!   entry is dropped, never the active key or a key with a fetch in flight.
//!
//! Everything runs on one thread. State lives in `RefCell`s and no borrow
//! is held across an `.await`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use tracing::debug;

use crate::catalog::{CatalogPage, CatalogSource, FetchError, QueryKey};

pub mod entry;

pub use entry::{CacheEntry, EntryState, EntryStatus};

/// Result of one fetch, shared by all of its waiters
pub type FetchResult = Result<CatalogPage, FetchError>;

type InFlight = Shared<LocalBoxFuture<'static, FetchResult>>;

/// One fetch in the coalescing map
struct Flight {
    id: u64,
    shared: InFlight,
    waiters: usize,
}

/// Default number of keys kept in the cache
pub const DEFAULT_CAPACITY: usize = 32;

/// Cache tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of distinct keys kept
    pub capacity: usize,
    /// Optional age after which resolved data is refetched on access.
    /// `None` keeps data fresh until it is revalidated or invalidated.
    pub stale_after: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stale_after: None,
        }
    }
}

struct Inner<S> {
    source: S,
    config: CacheConfig,
    entries: RefCell<HashMap<QueryKey, CacheEntry>>,
    in_flight: RefCell<HashMap<QueryKey, Flight>>,
    active: RefCell<Option<QueryKey>>,
    clock: Cell<u64>,
}

impl<S> Inner<S> {
    fn tick(&self) -> u64 {
        let next = self.clock.get() + 1;
        self.clock.set(next);
        next
    }

    /// Record the outcome of a fetch. Runs exactly once per fetch.
    fn settle(&self, key: &QueryKey, flight: u64, result: &FetchResult) {
        {
            let mut in_flight = self.in_flight.borrow_mut();
            if in_flight.get(key).is_some_and(|f| f.id == flight) {
                in_flight.remove(key);
            }
        }

        let tick = self.tick();
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::pending(key.clone(), tick));
        match result {
            Ok(page) => {
                debug!(%key, items = page.items.len(), "fetch resolved");
                entry.resolve(page.clone());
            }
            Err(error) => {
                debug!(%key, %error, "fetch failed");
                entry.fail(error.clone());
            }
        }
        drop(entries);
        self.evict();
    }

    /// A waiter of `flight` went away. The last one out drops the fetch and
    /// rolls its entry back.
    fn leave(&self, key: &QueryKey, flight: u64) {
        let abandoned = {
            let mut in_flight = self.in_flight.borrow_mut();
            let Some(current) = in_flight.get_mut(key) else {
                return;
            };
            if current.id != flight {
                return;
            }
            current.waiters -= 1;
            if current.waiters > 0 {
                return;
            }
            in_flight.remove(key)
        };

        debug!(%key, "fetch abandoned by every waiter");
        {
            let mut entries = self.entries.borrow_mut();
            if entries.get_mut(key).is_some_and(CacheEntry::abandon_refetch) {
                entries.remove(key);
            }
        }
        // Dropping the future releases its handle on the cache
        drop(abandoned);
    }

    fn evict(&self) {
        let mut entries = self.entries.borrow_mut();
        let in_flight = self.in_flight.borrow();
        let active = self.active.borrow();

        while entries.len() > self.config.capacity {
            let victim = entries
                .values()
                .filter(|e| active.as_ref() != Some(&e.key) && !in_flight.contains_key(&e.key))
                .min_by_key(|e| e.last_accessed)
                .map(|e| e.key.clone());

            let Some(victim) = victim else {
                break;
            };
            debug!(key = %victim, "evicting cache entry");
            entries.remove(&victim);
        }
    }
}

/// Registration of one caller on an in-flight fetch
struct Waiter<S> {
    inner: Weak<Inner<S>>,
    key: QueryKey,
    flight: u64,
}

impl<S> Drop for Waiter<S> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.leave(&self.key, self.flight);
        }
    }
}

/// Cached, coalescing front of a [`CatalogSource`]
///
/// Cloning yields another handle to the same cache.
pub struct QueryCache<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for QueryCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: CatalogSource + 'static> QueryCache<S> {
    #[must_use]
    pub fn new(source: S, config: CacheConfig) -> Self {
        let config = CacheConfig {
            capacity: config.capacity.max(1),
            ..config
        };
        Self {
            inner: Rc::new(Inner {
                source,
                config,
                entries: RefCell::new(HashMap::new()),
                in_flight: RefCell::new(HashMap::new()),
                active: RefCell::new(None),
                clock: Cell::new(0),
            }),
        }
    }

    /// Resolve a key, from cache when fresh
    ///
    /// Joins the in-flight fetch for `key` if there is one; otherwise
    /// starts a fetch, marking a new entry pending.
    pub async fn fetch(&self, key: QueryKey) -> FetchResult {
        if let Some(page) = self.fresh(&key) {
            debug!(%key, "cache hit");
            return Ok(page);
        }
        let (shared, _waiter) = self.join_or_start(key);
        shared.await
    }

    /// Refetch a key even if its data is fresh
    ///
    /// Resolved data stays visible until the new result lands. If a fetch
    /// for the key is already in flight it is joined instead.
    pub async fn revalidate(&self, key: QueryKey) -> FetchResult {
        debug!(%key, "revalidating");
        let (shared, _waiter) = self.join_or_start(key);
        shared.await
    }

    fn fresh(&self, key: &QueryKey) -> Option<CatalogPage> {
        let tick = self.inner.tick();
        let mut entries = self.inner.entries.borrow_mut();
        let entry = entries.get_mut(key)?;
        let page = entry.fresh_data(self.inner.config.stale_after)?.clone();
        entry.last_accessed = tick;
        Some(page)
    }

    fn join_or_start(&self, key: QueryKey) -> (InFlight, Waiter<S>) {
        let joined = self.inner.in_flight.borrow_mut().get_mut(&key).map(|flight| {
            flight.waiters += 1;
            (flight.shared.clone(), flight.id)
        });
        if let Some((shared, flight)) = joined {
            debug!(%key, "joining in-flight fetch");
            return (shared, self.waiter(key, flight));
        }

        let tick = self.inner.tick();
        {
            let mut entries = self.inner.entries.borrow_mut();
            match entries.get_mut(&key) {
                Some(entry) => {
                    entry.last_accessed = tick;
                    entry.begin_refetch();
                }
                None => {
                    entries.insert(key.clone(), CacheEntry::pending(key.clone(), tick));
                }
            }
        }

        debug!(%key, "starting fetch");
        let inner = Rc::clone(&self.inner);
        let fetch_key = key.clone();
        let shared = async move {
            let result = inner.source.fetch_page(&fetch_key).await;
            inner.settle(&fetch_key, tick, &result);
            result
        }
        .boxed_local()
        .shared();

        self.inner.in_flight.borrow_mut().insert(
            key.clone(),
            Flight {
                id: tick,
                shared: shared.clone(),
                waiters: 1,
            },
        );
        self.inner.evict();
        (shared, self.waiter(key, tick))
    }

    fn waiter(&self, key: QueryKey, flight: u64) -> Waiter<S> {
        Waiter {
            inner: Rc::downgrade(&self.inner),
            key,
            flight,
        }
    }

    /// Snapshot of an entry, counting as an access
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        let tick = self.inner.tick();
        let mut entries = self.inner.entries.borrow_mut();
        let entry = entries.get_mut(key)?;
        entry.last_accessed = tick;
        Some(entry.clone())
    }

    /// Snapshot of an entry without touching its access time
    #[must_use]
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.inner.entries.borrow().get(key).cloned()
    }

    /// Status of an entry without touching its access time
    #[must_use]
    pub fn status(&self, key: &QueryKey) -> Option<EntryStatus> {
        self.inner.entries.borrow().get(key).map(CacheEntry::status)
    }

    /// Store a page for a key as if it had just been fetched
    pub fn set(&self, key: QueryKey, page: CatalogPage) {
        let tick = self.inner.tick();
        self.inner
            .entries
            .borrow_mut()
            .insert(key.clone(), CacheEntry::resolved(key, page, tick));
        self.inner.evict();
    }

    /// Mark a key stale: its data stays visible but the next `fetch` goes
    /// to the source
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.entries.borrow_mut().get_mut(key) {
            debug!(%key, "invalidating");
            entry.invalidated = true;
        }
    }

    /// Mark every key stale
    pub fn invalidate_all(&self) {
        for entry in self.inner.entries.borrow_mut().values_mut() {
            entry.invalidated = true;
        }
    }

    /// Set the key whose state is currently displayed
    ///
    /// The active key is never evicted.
    pub fn set_active(&self, key: Option<QueryKey>) {
        if let Some(key) = &key {
            let tick = self.inner.tick();
            if let Some(entry) = self.inner.entries.borrow_mut().get_mut(key) {
                entry.last_accessed = tick;
            }
        }
        *self.inner.active.borrow_mut() = key;
    }

    #[must_use]
    pub fn active(&self) -> Option<QueryKey> {
        self.inner.active.borrow().clone()
    }

    #[must_use]
    pub fn is_active(&self, key: &QueryKey) -> bool {
        self.inner.active.borrow().as_ref() == Some(key)
    }

    /// Whether a fetch for `key` is in flight
    #[must_use]
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.inner.in_flight.borrow().contains_key(key)
    }

    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// The source behind this cache
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, character, page_of};
    use pretty_assertions::assert_eq;

    fn key(term: &str, page: &str) -> QueryKey {
        QueryKey::new(term, page)
    }

    fn cache_with(fake: &Rc<FakeCatalog>, capacity: usize) -> QueryCache<Rc<FakeCatalog>> {
        QueryCache::new(
            Rc::clone(fake),
            CacheConfig {
                capacity,
                stale_after: None,
            },
        )
    }

    #[tokio::test]
    async fn test_concurrent_identical_keys_share_one_request() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("Rick", "1");
        fake.respond(&k, Ok(page_of(vec![character("1", "Rick")], 1)));
        let gate = fake.gate(&k);
        let cache = cache_with(&fake, 8);

        let release = async {
            tokio::task::yield_now().await;
            assert!(cache.is_in_flight(&k));
            assert_eq!(cache.status(&k), Some(EntryStatus::Pending));
            gate.notify_one();
        };
        let (a, b, c, ()) = tokio::join!(
            cache.fetch(k.clone()),
            cache.fetch(k.clone()),
            cache.fetch(k.clone()),
            release
        );

        assert_eq!(fake.calls_for(&k), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.unwrap().items[0].name, "Rick");
        assert!(!cache.is_in_flight(&k));
    }

    #[tokio::test]
    async fn test_resolved_entry_served_from_cache() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        fake.respond(&k, Ok(page_of(vec![character("1", "Rick")], 2)));
        let cache = cache_with(&fake, 8);

        cache.fetch(k.clone()).await.unwrap();
        cache.fetch(k.clone()).await.unwrap();

        assert_eq!(fake.calls_for(&k), 1);
        assert_eq!(cache.status(&k), Some(EntryStatus::Resolved));
    }

    #[tokio::test]
    async fn test_data_belongs_to_its_own_key() {
        let fake = Rc::new(FakeCatalog::new());
        let rick = key("Rick", "1");
        let morty = key("Morty", "1");
        fake.respond(&rick, Ok(page_of(vec![character("1", "Rick")], 1)));
        fake.respond(&morty, Ok(page_of(vec![character("2", "Morty")], 1)));
        let cache = cache_with(&fake, 8);

        let (r, m) = tokio::join!(cache.fetch(rick.clone()), cache.fetch(morty.clone()));

        assert_eq!(r.unwrap().items[0].id, "1");
        assert_eq!(m.unwrap().items[0].id, "2");
        assert_eq!(cache.peek(&rick).unwrap().data().unwrap().items[0].id, "1");
        assert_eq!(cache.peek(&morty).unwrap().data().unwrap().items[0].id, "2");
    }

    #[tokio::test]
    async fn test_errors_are_stored_not_thrown() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("nobody", "1");
        fake.respond(&k, Err(FetchError::upstream(Some("There is nothing here".into()))));
        let cache = cache_with(&fake, 8);

        let result = cache.fetch(k.clone()).await;

        assert!(result.is_err());
        let entry = cache.peek(&k).unwrap();
        assert_eq!(entry.status(), EntryStatus::Errored);
        assert!(entry.data().is_none());
        assert_eq!(entry.error().unwrap().to_string(), "There is nothing here");
    }

    #[tokio::test]
    async fn test_errored_entry_is_refetched() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        fake.respond(&k, Err(FetchError::Network("offline".into())));
        let cache = cache_with(&fake, 8);

        assert!(cache.fetch(k.clone()).await.is_err());

        fake.respond(&k, Ok(page_of(vec![character("1", "Rick")], 1)));
        assert!(cache.fetch(k.clone()).await.is_ok());

        assert_eq!(fake.calls_for(&k), 2);
        assert_eq!(cache.status(&k), Some(EntryStatus::Resolved));
    }

    #[tokio::test]
    async fn test_revalidate_keeps_old_value_until_new_lands() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        fake.respond(&k, Ok(page_of(vec![character("1", "Rick")], 1)));
        let cache = cache_with(&fake, 8);
        cache.fetch(k.clone()).await.unwrap();

        fake.respond(&k, Ok(page_of(vec![character("1", "Rick C-137")], 1)));
        let gate = fake.gate(&k);

        let observe = async {
            tokio::task::yield_now().await;
            let entry = cache.peek(&k).unwrap();
            assert_eq!(entry.status(), EntryStatus::Resolved);
            assert!(entry.is_revalidating());
            assert_eq!(entry.data().unwrap().items[0].name, "Rick");
            gate.notify_one();
        };
        let (result, ()) = tokio::join!(cache.revalidate(k.clone()), observe);

        assert_eq!(result.unwrap().items[0].name, "Rick C-137");
        assert_eq!(fake.calls_for(&k), 2);
        let entry = cache.peek(&k).unwrap();
        assert!(!entry.is_revalidating());
        assert_eq!(entry.data().unwrap().items[0].name, "Rick C-137");
    }

    #[tokio::test]
    async fn test_revalidate_joins_pending_fetch() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        let gate = fake.gate(&k);
        let cache = cache_with(&fake, 8);

        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (a, b, ()) = tokio::join!(cache.fetch(k.clone()), cache.revalidate(k.clone()), release);

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fake.calls_for(&k), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        let cache = cache_with(&fake, 8);

        cache.fetch(k.clone()).await.unwrap();
        cache.invalidate(&k);
        assert_eq!(cache.status(&k), Some(EntryStatus::Resolved));

        cache.fetch(k.clone()).await.unwrap();
        cache.fetch(k.clone()).await.unwrap();
        assert_eq!(fake.calls_for(&k), 2);

        cache.invalidate_all();
        cache.fetch(k.clone()).await.unwrap();
        assert_eq!(fake.calls_for(&k), 3);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("Summer", "1");
        let cache = cache_with(&fake, 8);

        cache.set(k.clone(), page_of(vec![character("3", "Summer")], 1));
        let page = cache.fetch(k.clone()).await.unwrap();

        assert_eq!(page.items[0].name, "Summer");
        assert_eq!(fake.call_count(), 0);
        assert_eq!(cache.get(&k).unwrap().status(), EntryStatus::Resolved);
    }

    #[tokio::test]
    async fn test_lru_eviction_spares_active_key() {
        let fake = Rc::new(FakeCatalog::new());
        let (a, b, c) = (key("a", "1"), key("b", "1"), key("c", "1"));
        let cache = cache_with(&fake, 2);

        cache.set_active(Some(a.clone()));
        cache.fetch(a.clone()).await.unwrap();
        cache.fetch(b.clone()).await.unwrap();
        cache.fetch(c.clone()).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[tokio::test]
    async fn test_lru_eviction_order_follows_access() {
        let fake = Rc::new(FakeCatalog::new());
        let (a, b, c) = (key("a", "1"), key("b", "1"), key("c", "1"));
        let cache = cache_with(&fake, 2);

        cache.fetch(a.clone()).await.unwrap();
        cache.fetch(b.clone()).await.unwrap();
        // Touch `a` so `b` becomes the least recently used
        cache.fetch(a.clone()).await.unwrap();
        cache.fetch(c.clone()).await.unwrap();

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(fake.calls_for(&a), 1);
    }

    #[tokio::test]
    async fn test_eviction_spares_in_flight_key() {
        let fake = Rc::new(FakeCatalog::new());
        let (a, b, c) = (key("a", "1"), key("b", "1"), key("c", "1"));
        fake.respond(&a, Ok(page_of(vec![character("1", "Rick")], 1)));
        let a_gate = fake.gate(&a);
        let cache = cache_with(&fake, 1);

        let mut pending_a = Box::pin(cache.fetch(a.clone()));
        assert!(pending_a.as_mut().now_or_never().is_none());

        cache.fetch(b.clone()).await.unwrap();
        cache.fetch(c.clone()).await.unwrap();

        assert!(cache.contains(&a));
        assert!(cache.is_in_flight(&a));
        assert!(!cache.contains(&b));
        assert_eq!(cache.status(&a), Some(EntryStatus::Pending));

        a_gate.notify_one();
        let page = pending_a.await.unwrap();

        assert_eq!(page.items[0].name, "Rick");
        assert_eq!(cache.peek(&a).unwrap().data().unwrap().items[0].name, "Rick");
        assert!(!cache.is_in_flight(&a));
    }

    #[test]
    fn test_abandoned_fetches_release_their_keys() {
        let fake = Rc::new(FakeCatalog::new());
        let cache = cache_with(&fake, 1);

        for term in ["a", "b", "c", "d", "e"] {
            let k = key(term, "1");
            fake.gate(&k);
            assert!(cache.fetch(k.clone()).now_or_never().is_none());
            assert!(!cache.is_in_flight(&k));
            assert!(!cache.contains(&k));
        }
        assert!(cache.is_empty());

        let z = key("z", "1");
        cache.set_active(Some(z.clone()));
        assert!(matches!(cache.fetch(z.clone()).now_or_never(), Some(Ok(_))));
        assert_eq!(cache.len(), 1);
        assert_eq!(fake.call_count(), 6);

        // Nothing else holds on to the cache once it is gone
        drop(cache);
        assert_eq!(Rc::strong_count(&fake), 1);
    }

    #[test]
    fn test_abandoned_revalidation_keeps_data() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        let cache = cache_with(&fake, 4);
        cache.set(k.clone(), page_of(vec![character("1", "Rick")], 1));
        fake.gate(&k);

        assert!(cache.revalidate(k.clone()).now_or_never().is_none());

        let entry = cache.peek(&k).unwrap();
        assert_eq!(entry.status(), EntryStatus::Resolved);
        assert!(!entry.is_revalidating());
        assert_eq!(entry.data().unwrap().items[0].name, "Rick");
        assert!(!cache.is_in_flight(&k));
    }

    #[tokio::test]
    async fn test_dropping_one_waiter_keeps_shared_fetch() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("Rick", "1");
        fake.respond(&k, Ok(page_of(vec![character("1", "Rick")], 1)));
        let gate = fake.gate(&k);
        let cache = cache_with(&fake, 4);

        let mut first = Box::pin(cache.fetch(k.clone()));
        assert!(first.as_mut().now_or_never().is_none());
        assert!(cache.fetch(k.clone()).now_or_never().is_none());
        assert!(cache.is_in_flight(&k));

        gate.notify_one();
        assert_eq!(first.await.unwrap().items[0].name, "Rick");
        assert_eq!(fake.calls_for(&k), 1);
        assert_eq!(cache.status(&k), Some(EntryStatus::Resolved));
    }

    #[tokio::test]
    async fn test_stale_after_window_refetches() {
        let fake = Rc::new(FakeCatalog::new());
        let k = key("", "1");
        let cache = QueryCache::new(
            Rc::clone(&fake),
            CacheConfig {
                capacity: 4,
                stale_after: Some(Duration::from_millis(1)),
            },
        );

        cache.fetch(k.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.fetch(k.clone()).await.unwrap();

        assert_eq!(fake.calls_for(&k), 2);
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        let cache = QueryCache::new(
            FakeCatalog::new(),
            CacheConfig {
                capacity: 0,
                stale_after: None,
            },
        );
        assert_eq!(cache.config().capacity, 1);
        assert!(cache.is_empty());
    }
}
