//! Local tier: bounded, TTL-expiring LRU store.
//!
//! TTL is enforced lazily at read time; there is no background sweep.
//! An expired entry that nobody touches stays resident until its key
//! is read again or capacity pressure evicts it — a deliberate
//! memory/simplicity trade-off that keeps lock hold times O(1).

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use tracing::debug;

use crate::domain::artifact::Artifact;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

struct Entry {
    artifact: Artifact,
    inserted_at: Instant,
}

/// In-process artifact cache with LRU eviction and lazy expiry.
///
/// `get` and `put` both mutate the recency structure, so both take the
/// single entry lock. No I/O happens under it.
pub struct ArtifactStore {
    ttl: Duration,
    entries: Mutex<LruCache<String, Entry>>,
}

impl ArtifactStore {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the live artifact for `key`, refreshing its recency.
    ///
    /// An entry older than the TTL is removed here and reported as a
    /// miss; it is never returned stale.
    pub fn get(&self, key: &str) -> Option<Artifact> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");

        let expired = match entries.peek(key) {
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
            None => return None,
        };

        if expired {
            entries.pop(key);
            counter!("favella_cache_local_expired_total").increment(1);
            debug!(target = "favella::cache", key, "expired local entry removed at read");
            return None;
        }

        entries.get(key).map(|entry| entry.artifact.clone())
    }

    /// Insert or replace `key`. Replacement refreshes the value, the
    /// recency position, and the timestamp; inserting a new key at
    /// capacity evicts exactly the least-recently-used entry.
    pub fn put(&self, key: impl Into<String>, artifact: Artifact) {
        let key = key.into();
        let entry = Entry {
            artifact,
            inserted_at: Instant::now(),
        };

        let mut entries = mutex_lock(&self.entries, SOURCE, "put");
        if let Some((evicted_key, _)) = entries.push(key.clone(), entry) {
            if evicted_key != key {
                counter!("favella_cache_local_evicted_total").increment(1);
                debug!(target = "favella::cache", key = %evicted_key, "evicted least-recently-used entry");
            }
        }
    }

    /// Structural entry count. Counts not-yet-lazily-expired entries
    /// too: size reflects occupancy, not freshness.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically drop all entries.
    pub fn clear(&self) {
        mutex_lock(&self.entries, SOURCE, "clear").clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::OffsetDateTime;

    use crate::domain::artifact::ArtifactMetadata;

    use super::*;

    fn sample(id: &str) -> Artifact {
        Artifact {
            component_name: "WelcomeComponent".to_string(),
            component_kind: "functional".to_string(),
            language: "en".to_string(),
            body: String::new(),
            localized_values: BTreeMap::new(),
            metadata: ArtifactMetadata {
                artifact_id: id.to_string(),
                generated_at: OffsetDateTime::UNIX_EPOCH,
                required_keys: Vec::new(),
            },
            served_from_cache: false,
        }
    }

    fn store(capacity: usize, ttl: Duration) -> ArtifactStore {
        ArtifactStore::new(NonZeroUsize::new(capacity).expect("capacity"), ttl)
    }

    #[test]
    fn capacity_bound_evicts_least_recently_used() {
        let store = store(2, Duration::from_secs(60));

        store.put("a", sample("1"));
        store.put("b", sample("2"));
        store.put("c", sample("3"));

        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
        assert!(store.get("b").is_some());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn read_refreshes_recency() {
        let store = store(2, Duration::from_secs(60));

        store.put("a", sample("1"));
        store.put("b", sample("2"));

        // Touch `a` so `b` becomes the eviction candidate.
        assert!(store.get("a").is_some());

        store.put("d", sample("4"));

        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("d").is_some());
    }

    #[test]
    fn replace_refreshes_value_and_recency() {
        let store = store(2, Duration::from_secs(60));

        store.put("a", sample("1"));
        store.put("b", sample("2"));
        store.put("a", sample("1-updated"));
        store.put("c", sample("3"));

        // `b` was least recently used after the replace, not `a`.
        assert!(store.get("b").is_none());
        let kept = store.get("a").expect("replaced entry");
        assert_eq!(kept.metadata.artifact_id, "1-updated");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_entry_is_a_miss_and_removed_at_read() {
        let store = store(4, Duration::from_millis(10));

        store.put("a", sample("1"));
        assert_eq!(store.len(), 1);

        std::thread::sleep(Duration::from_millis(30));

        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn expired_but_unaccessed_entries_still_count() {
        let store = store(4, Duration::from_millis(10));

        store.put("a", sample("1"));
        store.put("b", sample("2"));
        std::thread::sleep(Duration::from_millis(30));

        // No sweep: size reflects structure until the keys are read.
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let store = store(4, Duration::from_secs(60));
        store.put("a", sample("1"));
        store.put("b", sample("2"));

        store.clear();

        assert!(store.is_empty());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = store(4, Duration::from_secs(60));

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.entries.lock().expect("entry lock");
            panic!("poison entry lock");
        }));

        store.put("a", sample("1"));
        assert!(store.get("a").is_some());
    }
}
