//! In-memory provider response cache.
//!
//! Deduplicates repeated lookups within a short window. Only successful
//! fetches are stored. Expiry is passive: stale entries are ignored (and
//! dropped) when looked up, never swept in the background.
//!
//! Concurrent fetches for the same key are allowed to race; the last writer
//! wins. Provider calls are idempotent reads, so no single-flight is needed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::domain::{Provider, ProviderRequest, RawPayload};

/// Identity of a cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: Provider,
    digits: String,
    /// Municipal PF results depend on the birth date as well
    birth_date: Option<String>,
}

impl From<&ProviderRequest> for CacheKey {
    fn from(request: &ProviderRequest) -> Self {
        Self {
            provider: request.provider,
            digits: request.document.digits().to_string(),
            birth_date: request.birth_date.as_ref().map(|d| d.as_str().to_string()),
        }
    }
}

struct CacheEntry {
    payload: RawPayload,
    fetched_at: Instant,
}

/// TTL cache shared by all lookups of one service.
pub struct ResultCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached payload for `key`, if it is still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<RawPayload> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &CacheKey, now: Instant) -> Option<RawPayload> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        // Stale: drop it unless another writer refreshed it meanwhile
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| !self.is_fresh(entry, now)) {
            entries.remove(key);
        }
        None
    }

    /// Store a successful payload.
    pub fn put(&self, key: CacheKey, payload: RawPayload) {
        self.put_at(key, payload, Instant::now());
    }

    pub(crate) fn put_at(&self, key: CacheKey, payload: RawPayload, fetched_at: Instant) {
        self.entries.write().insert(
            key,
            CacheEntry {
                payload,
                fetched_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) < self.ttl
    }
}
