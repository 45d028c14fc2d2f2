use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::Expr;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Bounded map from rule id to its decoded tree.
///
/// Only ever holds copies of what the registry stores; losing an entry costs
/// a decode, nothing more.
pub struct RuleCache {
    entries: Mutex<LruCache<String, Arc<Expr>>>,
}

impl RuleCache {
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Expr>> {
        self.entries.lock().get(id).cloned()
    }

    pub fn put(&self, id: impl Into<String>, expr: Arc<Expr>) {
        self.entries.lock().put(id.into(), expr);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for RuleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for RuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("RuleCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[test]
    fn get_after_put() {
        let cache = RuleCache::new(4);
        let expr = Arc::new(field("age").gt(30_i64));
        cache.put("rule1", Arc::clone(&expr));
        assert_eq!(cache.get("rule1"), Some(expr));
        assert_eq!(cache.get("rule2"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = RuleCache::new(2);
        cache.put("rule1", Arc::new(field("a").eq(1_i64)));
        cache.put("rule2", Arc::new(field("b").eq(2_i64)));
        assert!(cache.get("rule1").is_some());
        cache.put("rule3", Arc::new(field("c").eq(3_i64)));

        assert!(cache.get("rule1").is_some());
        assert!(cache.get("rule2").is_none());
        assert!(cache.get("rule3").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let cache = RuleCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put("rule1", Arc::new(field("a").eq(1_i64)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties() {
        let cache = RuleCache::default();
        cache.put("rule1", Arc::new(field("a").eq(1_i64)));
        cache.clear();
        assert!(cache.is_empty());
    }
}
