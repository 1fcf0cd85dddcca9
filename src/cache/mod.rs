//! Per-task result cache with TTL and lazy eviction.
//!
//! Entries are keyed by `(task id, content fingerprint)`; the fingerprint is
//! a truncated SHA-256 over salient input fields (see [`fingerprint`]).
//! Expired entries are removed by the read that finds them. Internal faults
//! never reach callers: anything that goes wrong inside the cache degrades
//! to a miss and is logged.
//!
//! # Examples
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use rubriq::cache::{fingerprint, ResultCache};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let cache = ResultCache::new(Duration::from_secs(24 * 3600));
//! let digest = fingerprint(["document body"]);
//!
//! assert!(cache.get("lint", &digest).is_none());
//! cache.put("lint", &digest, json!({"warnings": 0}));
//! assert!(cache.get("lint", &digest).is_some());
//! assert_eq!(cache.stats().hits, 1);
//! # }
//! ```

mod hash;

pub use hash::{fingerprint, FINGERPRINT_LEN};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    task: String,
    digest: String,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

/// Snapshot of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`; 0.0 before any lookups.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// In-memory result cache shared across jobs.
pub struct ResultCache {
    entries: Mutex<FxHashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Default time-to-live: 24 hours.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a payload; a hit requires presence and freshness.
    ///
    /// An expired entry found by this read is removed on the spot.
    pub fn get(&self, task: &str, digest: &str) -> Option<Value> {
        let key = CacheKey {
            task: task.to_string(),
            digest: digest.to_string(),
        };
        let mut entries = self.entries.lock().expect("cache map poisoned");
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.payload.clone())
            }
            Some(_) => {
                debug!(task, digest, "evicting expired cache entry");
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Typed lookup. A payload that no longer decodes counts as a miss and
    /// is dropped, keeping cache faults invisible to callers.
    pub fn get_as<T: DeserializeOwned>(&self, task: &str, digest: &str) -> Option<T> {
        let payload = self.get(task, digest)?;
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(task, digest, error = %err, "cached payload failed to decode; treating as miss");
                let key = CacheKey {
                    task: task.to_string(),
                    digest: digest.to_string(),
                };
                self.entries
                    .lock()
                    .expect("cache map poisoned")
                    .remove(&key);
                // The get above counted a hit for an unusable entry.
                self.hits.fetch_sub(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a payload with the configured TTL.
    pub fn put(&self, task: &str, digest: &str, payload: Value) {
        let key = CacheKey {
            task: task.to_string(),
            digest: digest.to_string(),
        };
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .expect("cache map poisoned")
            .insert(key, entry);
    }

    /// Drop every entry belonging to one task id.
    pub fn invalidate_task(&self, task: &str) {
        let mut entries = self.entries.lock().expect("cache map poisoned");
        let before = entries.len();
        entries.retain(|key, _| key.task != task);
        debug!(task, removed = before - entries.len(), "invalidated cache scope");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().expect("cache map poisoned").len(),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
