//! Time-bounded memoisation shared across concurrent viewers.
//!
//! ## Keys
//!
//! An entry is keyed by the memoised function's name and the `Debug`
//! rendering of its arguments.
//!
//! ## Single flight
//!
//! Hits read the entry table without taking any per-key lock. On a miss the
//! caller takes the key's async mutex, re-checks, and only then computes, so
//! k concurrent callers on a cold key produce exactly one computation and all
//! observe the same `Arc`.

use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

type SharedValue = Arc<dyn Any + Send + Sync>;

/// Identity of a memoised call: function name plus rendered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    function: &'static str,
    args: String,
}

impl MemoKey {
    pub fn new<A: Debug + ?Sized>(function: &'static str, args: &A) -> Self {
        Self {
            function,
            args: format!("{args:?}"),
        }
    }
}

/// Cache entry with metadata.
struct CacheEntry {
    value: SharedValue,
    /// When the value was stored.
    cached_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }
}

/// Process-wide memoisation store, owned by the application root.
#[derive(Default)]
pub struct MemoStore {
    entries: DashMap<MemoKey, CacheEntry>,
    /// Per-key locks serialising computations on a cold or expired key.
    inflight: DashMap<MemoKey, Arc<Mutex<()>>>,
}

impl MemoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh value for `key`, computing and storing it on a miss.
    ///
    /// A value stored under the same key with a different type counts as a
    /// miss and is replaced.
    pub async fn get_or_compute<T, F, Fut>(&self, key: MemoKey, ttl: Duration, compute: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(value) = self.lookup::<T>(&key) {
            tracing::debug!(function = key.function, "memo hit");
            return value;
        }

        let lock = self.inflight.entry(key.clone()).or_default().value().clone();
        let _guard = lock.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.lookup::<T>(&key) {
            tracing::debug!(function = key.function, "memo hit after wait");
            return value;
        }

        tracing::debug!(function = key.function, args = %key.args, "memo miss");
        let value = Arc::new(compute().await);
        let shared: SharedValue = value.clone();
        self.entries.insert(
            key,
            CacheEntry {
                value: shared,
                cached_at: Instant::now(),
                ttl,
            },
        );
        value
    }

    fn lookup<T: Send + Sync + 'static>(&self, key: &MemoKey) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        entry.value.clone().downcast::<T>().ok()
    }

    /// Remove all expired entries and the idle locks of keys no longer
    /// stored. Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        self.inflight
            .retain(|key, lock| Arc::strong_count(lock) > 1 || self.entries.contains_key(key));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries (including expired).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An async function wrapped with a shared TTL cache.
pub struct Memoized<A, T, F> {
    store: Arc<MemoStore>,
    function: &'static str,
    ttl: Duration,
    f: F,
    _marker: PhantomData<fn(A) -> T>,
}

/// Wrap `f` so that calls with equal arguments within `ttl` share one result.
pub fn memoize<A, T, F, Fut>(
    store: &Arc<MemoStore>,
    function: &'static str,
    ttl: Duration,
    f: F,
) -> Memoized<A, T, F>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = T>,
{
    Memoized {
        store: Arc::clone(store),
        function,
        ttl,
        f,
        _marker: PhantomData,
    }
}

impl<A, T, F, Fut> Memoized<A, T, F>
where
    A: Debug,
    T: Send + Sync + 'static,
    F: Fn(A) -> Fut,
    Fut: Future<Output = T>,
{
    pub async fn call(&self, args: A) -> Arc<T> {
        let key = MemoKey::new(self.function, &args);
        self.store
            .get_or_compute(key, self.ttl, || (self.f)(args))
            .await
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
