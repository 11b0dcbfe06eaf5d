//! Bounded, time-expiring result caches.
//!
//! Two tiers are kept apart: raw external responses per (query, limit), and
//! fully ranked result lists per (query, options). Writers never coordinate;
//! the most recent write for a key wins.

use crate::config::{CacheConfig, ScoringWeights};
use crate::search::tokenize::normalize_name;
use crate::types::{GameCandidate, RankedGame, SearchOptions};
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use xxhash_rust::xxh3::xxh3_64;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// An LRU cache whose entries also expire after a fixed TTL.
///
/// Expired entries are dropped lazily on read and in bulk by [`TtlCache::sweep`].
pub struct TtlCache<K, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().put(key, entry);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        let removed = expired.len();
        for key in expired {
            entries.pop(&key);
        }
        removed
    }

    /// Number of stored entries, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field(
                "len",
                &self.entries.lock().map_or(0, |entries| entries.len()),
            )
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Cache key: xxh3 hash of the normalized inputs.
pub type CacheKey = u64;

pub fn external_key(query: &str, limit: usize) -> CacheKey {
    xxh3_64(format!("ext\0{}\0{}", normalize_name(query), limit).as_bytes())
}

/// Ranked results depend on the weights in force, so they are part of the key.
pub fn ranked_key(query: &str, options: &SearchOptions, weights: &ScoringWeights) -> CacheKey {
    let weights = [
        weights.name_match,
        weights.rating,
        weights.likes,
        weights.buzz,
        weights.franchise_importance,
    ]
    .map(f64::to_bits);
    xxh3_64(
        format!(
            "ranked\0{}\0{}\0{}\0{}\0{:?}",
            normalize_name(query),
            options.limit,
            options.include_external_source,
            options.apply_content_filter,
            weights
        )
        .as_bytes(),
    )
}

/// The two cache tiers shared by every search.
#[derive(Debug)]
pub struct SearchCache {
    pub external: TtlCache<CacheKey, Vec<GameCandidate>>,
    pub ranked: TtlCache<CacheKey, Vec<RankedGame>>,
}

impl SearchCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            external: TtlCache::new(
                config.capacity,
                Duration::from_secs(config.external_ttl_secs),
            ),
            ranked: TtlCache::new(config.capacity, Duration::from_secs(config.ranked_ttl_secs)),
        }
    }

    /// Sweeps both tiers.
    pub fn sweep(&self) -> usize {
        self.external.sweep() + self.ranked.sweep()
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache: TtlCache<u64, &str> = TtlCache::new(4, Duration::from_secs(10));
        cache.insert(1, "one");
        check!(cache.get(&1) == Some("one"));

        tokio::time::advance(Duration::from_secs(11)).await;
        check!(cache.get(&1).is_none());
        check!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache: TtlCache<u64, u32> = TtlCache::new(4, Duration::from_secs(10));
        cache.insert(1, 1);
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.insert(2, 2);
        tokio::time::advance(Duration::from_secs(6)).await;

        check!(cache.sweep() == 1);
        check!(cache.len() == 1);
        check!(cache.get(&2) == Some(2));
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache: TtlCache<u64, u32> = TtlCache::new(2, Duration::from_secs(60));
        cache.insert(1, 1);
        cache.insert(2, 2);
        let _ = cache.get(&1);
        cache.insert(3, 3);

        check!(cache.get(&2).is_none());
        check!(cache.get(&1) == Some(1));
        check!(cache.get(&3) == Some(3));
    }

    #[test]
    fn test_keys_normalize_query() {
        check!(external_key("Super  Mario", 30) == external_key("super mario", 30));
        check!(external_key("super mario", 30) != external_key("super mario", 60));

        let options = SearchOptions::default();
        let unfiltered = SearchOptions {
            apply_content_filter: false,
            ..options
        };
        let weights = ScoringWeights::default();
        check!(ranked_key("halo", &options, &weights) != ranked_key("halo", &unfiltered, &weights));
        check!(ranked_key("halo", &options, &weights) != external_key("halo", options.limit));
    }

    #[test]
    fn test_ranked_key_tracks_weights() {
        let options = SearchOptions::default();
        let weights = ScoringWeights::default();
        let retuned = ScoringWeights {
            rating: 40.0,
            ..weights
        };
        check!(ranked_key("Halo", &options, &weights) == ranked_key("halo", &options, &weights));
        check!(ranked_key("halo", &options, &weights) != ranked_key("halo", &options, &retuned));
    }

    #[test]
    fn test_debug_reports_len() {
        let cache: TtlCache<u64, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.insert(1, 1);
        check!(format!("{:?}", cache).contains("len: 1"));
    }
}
