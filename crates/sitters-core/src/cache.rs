use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use sitters_types::CacheKey;

/// Keyed result store consulted before the call driver runs.
///
/// The supervisor probes on admission and inserts only results that reached
/// `Completed` in that invocation; timeouts, failures, cancellations, and
/// restarts never write. Implementations are shared immutably across
/// invocations, so interior mutability is the implementor's concern.
pub trait SitCache<R>: Send + Sync {
    fn contains(&self, key: &CacheKey) -> bool;
    fn get(&self, key: &CacheKey) -> Option<R>;
    fn insert(&self, key: CacheKey, value: R);
}

/// Bounded in-memory cache with least-recently-used eviction.
pub struct LruCache<R> {
    max_entries: usize,
    inner: Mutex<Inner<R>>,
}

struct Inner<R> {
    entries: HashMap<CacheKey, R>,
    /// Keys ordered from least to most recently used.
    order: VecDeque<CacheKey>,
}

impl<R> LruCache<R> {
    /// `max_entries` must be at least 1.
    pub fn new(max_entries: usize) -> Self {
        debug_assert!(max_entries > 0, "LruCache requires room for one entry");
        Self {
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl<R> Inner<R> {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.order.push_back(key.clone());
    }
}

impl<R: Clone + Send> SitCache<R> for LruCache<R> {
    fn contains(&self, key: &CacheKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    fn get(&self, key: &CacheKey) -> Option<R> {
        let mut inner = self.inner.lock();
        let value = inner.entries.get(key).cloned()?;
        inner.touch(key);
        Some(value)
    }

    fn insert(&self, key: CacheKey, value: R) {
        let mut inner = self.inner.lock();
        if inner.entries.insert(key.clone(), value).is_none()
            && inner.entries.len() > self.max_entries
            && let Some(evicted) = inner.order.pop_front()
        {
            inner.entries.remove(&evicted);
        }
        inner.touch(&key);
    }
}
