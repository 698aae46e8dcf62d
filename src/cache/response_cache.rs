use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Thread-safe LRU cache for decoded TMDb responses
///
/// Frontier actors can be queried many times during a crawl; caching the
/// unfiltered response per endpoint path lets repeated queries skip the network.
pub struct ResponseCache<V> {
    cache: Mutex<LruCache<String, V>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a new response cache with the specified capacity
    ///
    /// A capacity of 0 is bumped to 1; callers that want no caching
    /// should not construct a cache at all.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Get a cached response for an endpoint path
    pub fn get(&self, key: &str) -> Option<V> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    /// Store a response under its endpoint path
    pub fn put(&self, key: String, value: V) {
        self.cache.lock().unwrap().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_put_and_get() {
        let cache = ResponseCache::new(10);
        cache.put("/movie/603/credits".to_string(), vec![1u32, 2, 3]);

        assert_eq!(cache.get("/movie/603/credits"), Some(vec![1, 2, 3]));
        assert!(cache.get("/movie/604/credits").is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = ResponseCache::new(2);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        // Touch "a" so "b" becomes least recently used
        let _ = cache.get("a");
        cache.put("c".to_string(), 3);

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none()); // Evicted
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_zero_capacity_holds_one() {
        let cache = ResponseCache::new(0);
        assert!(cache.is_empty());

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }
}
