use dashmap::DashMap;

/// Reserved listing-cache key holding the full vector of listing entries.
pub const LISTINGS_KEY: &str = "__LISTINGS__";

/// Minimal key-value capability both cache tiers rely on. Absence is an
/// observable condition (`None`), never an empty value.
pub trait KvCache<T>: Send + Sync {
    fn set(&self, key: &str, value: T);
    fn get(&self, key: &str) -> Option<T>;
}

/// DashMap-backed cache: safe for concurrent readers alongside the
/// synchronizer's writes, with no locking layered on by callers.
#[derive(Debug)]
pub struct MemoryCache<T> {
    entries: DashMap<String, T>,
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every cached value.
    pub fn values(&self) -> Vec<T> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone + Send + Sync> KvCache<T> for MemoryCache<T> {
    fn set(&self, key: &str, value: T) {
        self.entries.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|e| e.value().clone())
    }
}
