//! Session-scoped key/value caches.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::document::RepositoryNode;
use crate::session::SessionKey;

// =============================================================================
// SessionCache Trait
// =============================================================================

/// A cache whose entries are scoped to a session and a cache name.
///
/// Entries are never invalidated by callers; any eviction is the
/// implementation's own policy. Implementations guard their own state, so a
/// cache may be shared between concurrent requests.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Whether the cache stores anything at all.
    fn is_enabled(&self) -> bool;

    /// Look up an entry, returning `None` on a miss.
    async fn get(&self, session: &SessionKey, cache_name: &str) -> Option<Arc<RepositoryNode>>;

    /// Store an entry, replacing any previous value.
    async fn put(&self, session: &SessionKey, cache_name: &str, value: Arc<RepositoryNode>);
}

// =============================================================================
// NoopSessionCache
// =============================================================================

/// A disabled cache. Every lookup misses and nothing is stored.
pub struct NoopSessionCache;

#[async_trait]
impl SessionCache for NoopSessionCache {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn get(&self, _session: &SessionKey, _cache_name: &str) -> Option<Arc<RepositoryNode>> {
        None
    }

    async fn put(&self, _session: &SessionKey, _cache_name: &str, _value: Arc<RepositoryNode>) {}
}

// =============================================================================
// MemorySessionCache
// =============================================================================

type CacheKey = (SessionKey, String);

/// In-memory session cache with optional LRU eviction.
pub struct MemorySessionCache {
    entries: Mutex<LruCache<CacheKey, Arc<RepositoryNode>>>,
}

impl MemorySessionCache {
    /// Create a cache holding at most `max_entries` entries, or an unbounded
    /// cache when `max_entries` is `None`.
    pub fn new(max_entries: Option<NonZeroUsize>) -> Self {
        let cache = match max_entries {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(cache),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get(&self, session: &SessionKey, cache_name: &str) -> Option<Arc<RepositoryNode>> {
        let key = (session.clone(), cache_name.to_string());
        self.entries.lock().await.get(&key).cloned()
    }

    async fn put(&self, session: &SessionKey, cache_name: &str, value: Arc<RepositoryNode>) {
        let key = (session.clone(), cache_name.to_string());
        self.entries.lock().await.put(key, value);
    }
}
