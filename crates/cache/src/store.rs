use crate::key::{CacheKey, Operation};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::instrument;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted: Instant,
    ttl: Duration,
}
impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted) < self.ttl
    }
}

/// Per-key slot. Holding its lock is what makes a caller "the" computation
/// for that key; everyone else queues behind it.
type Slot<V> = Arc<AsyncMutex<Option<Entry<V>>>>;

/// A value returned from [`Cache::get_or_compute`], and whether it was
/// served without computing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<V> {
    pub value: V,
    pub hit: bool,
}

/// TTL cache for one record type.
///
/// The outer map lock is only ever held for map bookkeeping, never across an
/// `.await`; the per-key async lock is held while computing.
#[derive(Debug)]
pub struct Cache<V> {
    slots: Mutex<HashMap<CacheKey, Slot<V>>>,
}
impl<V> Default for Cache<V> {
    fn default() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }
}

impl<V: Clone> Cache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// With `force_refresh` any stored value is discarded first, so `compute`
    /// always runs. Only `Ok` values are stored; an `Err` is handed back to
    /// the caller and the key is forgotten unless another caller is waiting
    /// on it.
    #[instrument(level = "debug", skip(self, key, compute), fields(key = %key, hit))]
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        force_refresh: bool,
        compute: F,
    ) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;
        if force_refresh {
            entry.take();
        }
        if let Some(existing) = entry.as_ref() {
            if existing.is_fresh(Instant::now()) {
                tracing::Span::current().record("hit", true);
                tracing::debug!("Cache hit");
                return Ok(Cached { value: existing.value.clone(), hit: true });
            }
            tracing::debug!("Cache entry expired");
            entry.take();
        }
        tracing::Span::current().record("hit", false);
        match compute().await {
            Ok(value) => {
                *entry = Some(Entry {
                    value: value.clone(),
                    inserted: Instant::now(),
                    ttl,
                });
                tracing::debug!("Cache miss; stored fresh value");
                Ok(Cached { value, hit: false })
            },
            Err(err) => {
                drop(entry);
                self.release(&key, slot);
                Err(err)
            },
        }
    }

    /// Drops the entry for one key.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock_slots().remove(key).is_some()
    }

    /// Drops every entry whose operation is in `operations`, and every idle
    /// expired entry regardless of operation. Returns how many entries of the
    /// named operations were dropped.
    ///
    /// Computations already in flight for those keys still finish, but store
    /// into a slot that is no longer reachable.
    pub fn invalidate_all(&self, operations: &[Operation]) -> usize {
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|key, _| !operations.contains(&key.operation));
        let dropped = before - slots.len();
        let expired = Self::purge(&mut slots, Instant::now());
        tracing::debug!(dropped, expired, "Invalidated cache entries");
        dropped
    }

    /// Forgets every idle key whose entry is missing or expired.
    pub fn purge_expired(&self) -> usize {
        Self::purge(&mut self.lock_slots(), Instant::now())
    }

    /// Number of tracked keys, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slot for `key`, creating it on first use. Creating a key also
    /// sweeps out idle expired ones, so the map stays bounded by the keys
    /// that are still live.
    fn slot(&self, key: &CacheKey) -> Slot<V> {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get(key) {
            return slot.clone();
        }
        Self::purge(&mut slots, Instant::now());
        slots.entry(key.clone()).or_default().clone()
    }

    /// Forgets `key` if its slot is empty and nobody else holds it.
    fn release(&self, key: &CacheKey, slot: Slot<V>) {
        let mut slots = self.lock_slots();
        // No new clones can be taken while the map lock is held.
        drop(slot);
        if slots.get(key).is_some_and(|current| Self::is_stale(current, Instant::now())) {
            slots.remove(key);
        }
    }

    fn purge(slots: &mut HashMap<CacheKey, Slot<V>>, now: Instant) -> usize {
        let before = slots.len();
        slots.retain(|_, slot| !Self::is_stale(slot, now));
        before - slots.len()
    }

    /// Idle (only the map refers to it, nobody holds its lock) and holding
    /// nothing fresh.
    fn is_stale(slot: &Slot<V>, now: Instant) -> bool {
        Arc::strong_count(slot) == 1
            && slot.try_lock().is_ok_and(|entry| entry.as_ref().is_none_or(|entry| !entry.is_fresh(now)))
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot<V>>> {
        // Nothing panics while holding the map lock, but recover rather than
        // poison every later caller if that ever changes.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    fn key(args: &str) -> CacheKey {
        CacheKey::new(Operation::Detail, args)
    }

    /// Computation that counts its invocations and returns the new count.
    fn counting(calls: &AtomicUsize) -> impl Future<Output = Result<usize, ()>> + '_ {
        async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_a_hit() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        let first = cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        let second = cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        assert_eq!(first, Cached { value: 1, hit: false });
        assert_eq!(second, Cached { value: 1, hit: true });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_refresh_always_computes() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        let forced = cache.get_or_compute(key("a"), TTL, true, || counting(&calls)).await.unwrap();
        assert_eq!(forced, Cached { value: 2, hit: false });
        let after = cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        assert_eq!(after, Cached { value: 2, hit: true });
    }

    #[rstest]
    #[case(Duration::from_secs(299), true)]
    #[case(Duration::from_secs(300), false)]
    #[case(Duration::from_secs(900), false)]
    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl(#[case] elapsed: Duration, #[case] hit: bool) {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        tokio::time::advance(elapsed).await;
        let again = cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        assert_eq!(again.hit, hit);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_are_coalesced() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            counting(&calls).await
        };
        let (a, b, c) = tokio::join!(
            cache.get_or_compute(key("a"), TTL, false, slow),
            cache.get_or_compute(key("a"), TTL, false, slow),
            cache.get_or_compute(key("a"), TTL, false, slow),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let hits = [a.unwrap(), b.unwrap(), c.unwrap()].iter().filter(|cached| cached.hit).count();
        assert_eq!(hits, 2);
    }

    #[tokio::test]
    async fn failures_are_not_stored() {
        let cache: Cache<usize> = Cache::new();
        let failed = cache.get_or_compute(key("a"), TTL, false, || async { Err::<usize, _>("upstream down") }).await;
        assert_eq!(failed, Err("upstream down"));
        let calls = AtomicUsize::new(0);
        let retried = cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        assert!(!retried.hit);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_and_expired_keys_are_forgotten() {
        let cache: Cache<usize> = Cache::new();
        for n in 0..100 {
            let failed = cache.get_or_compute(key(&format!("gone-{n}")), TTL, false, || async { Err("not found") }).await;
            assert!(failed.is_err());
        }
        assert_eq!(cache.len(), 0);

        let calls = AtomicUsize::new(0);
        for n in 0..100 {
            let search = CacheKey::new(Operation::Search, format!("query {n}"));
            cache.get_or_compute(search, Duration::from_secs(1), false, || counting(&calls)).await.unwrap();
        }
        assert_eq!(cache.len(), 100);
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.invalidate_all(&[Operation::Listing, Operation::Detail, Operation::Chapter]), 0);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn new_keys_sweep_expired_ones() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        cache.get_or_compute(key("old"), Duration::from_secs(1), false, || counting(&calls)).await.unwrap();
        cache.get_or_compute(key("kept"), TTL, false, || counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        cache.get_or_compute(key("new"), TTL, false, || counting(&calls)).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.purge_expired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_callers_keep_a_failed_key() {
        let cache: Cache<usize> = Cache::new();
        let calls = AtomicUsize::new(0);
        let failing = || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err("upstream down")
        };
        let (failed, retried) = tokio::join!(
            cache.get_or_compute(key("a"), TTL, false, failing),
            cache.get_or_compute(key("a"), TTL, false, || async { counting(&calls).await.map_err(|()| "unreachable") }),
        );
        assert_eq!(failed, Err("upstream down"));
        assert_eq!(retried.unwrap(), Cached { value: 1, hit: false });
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_all_only_drops_named_operations() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        for operation in Operation::ALL {
            let key = CacheKey::new(operation, "x");
            cache.get_or_compute(key, TTL, false, || counting(&calls)).await.unwrap();
        }
        assert_eq!(cache.invalidate_all(&[Operation::Listing, Operation::Detail, Operation::Chapter]), 3);
        assert_eq!(cache.len(), 1);
        let search = cache.get_or_compute(CacheKey::new(Operation::Search, "x"), TTL, false, || counting(&calls)).await;
        assert!(search.unwrap().hit);
    }

    #[tokio::test]
    async fn invalidate_drops_a_single_key() {
        let cache = Cache::new();
        let calls = AtomicUsize::new(0);
        cache.get_or_compute(key("a"), TTL, false, || counting(&calls)).await.unwrap();
        cache.get_or_compute(key("b"), TTL, false, || counting(&calls)).await.unwrap();
        assert!(cache.invalidate(&key("a")));
        assert!(!cache.invalidate(&key("a")));
        let b = cache.get_or_compute(key("b"), TTL, false, || counting(&calls)).await.unwrap();
        assert!(b.hit);
    }
}
