use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::store::Store;

/// Bumped whenever a cached payload's shape changes. Entries written under
/// an older version are discarded, never deserialized into the new shape.
pub const CACHE_SCHEMA_VERSION: &str = "3";

/// Cache namespaces, one per analyzer plus the derived-metrics batch.
pub mod ns {
    pub const METRICS: &str = "metrics";
    pub const TIMING: &str = "timing";
    pub const LOAD: &str = "load";
    pub const STRENGTH: &str = "strength";
    pub const TREND: &str = "trend";
    pub const BURNOUT: &str = "burnout";
    pub const CHEMISTRY: &str = "chemistry";
    pub const PREDICTION: &str = "prediction";

    pub const ALL: &[&str] = &[
        METRICS, TIMING, LOAD, STRENGTH, TREND, BURNOUT, CHEMISTRY, PREDICTION,
    ];
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    version: String,
    computed_at: DateTime<Utc>,
    ttl_hours: i64,
    payload: T,
}

/// Versioned, namespaced, TTL-gated cache over a byte store. Missing key,
/// version mismatch, and TTL expiry all read as absent; callers fall
/// through to recomputation in every case.
pub struct AnalysisCache {
    store: Box<dyn Store>,
    clock: fn() -> DateTime<Utc>,
}

impl AnalysisCache {
    pub fn new(store: Box<dyn Store>) -> Self {
        Self {
            store,
            clock: Utc::now,
        }
    }

    /// Test seam: inject a clock to simulate TTL expiry.
    pub fn with_clock(store: Box<dyn Store>, clock: fn() -> DateTime<Utc>) -> Self {
        Self { store, clock }
    }

    fn key(namespace: &str, subject: &str) -> String {
        format!("{namespace}:{subject}")
    }

    pub fn get<T: DeserializeOwned>(&self, namespace: &str, subject: &str) -> Option<T> {
        self.read(namespace, subject, false)
    }

    /// Honors the version gate but not the TTL. Used only as a fallback
    /// when the adapter times out and a fresh recompute is impossible.
    pub fn get_stale<T: DeserializeOwned>(&self, namespace: &str, subject: &str) -> Option<T> {
        self.read(namespace, subject, true)
    }

    fn read<T: DeserializeOwned>(
        &self,
        namespace: &str,
        subject: &str,
        allow_expired: bool,
    ) -> Option<T> {
        let key = Self::key(namespace, subject);
        let bytes = self.store.get(&key)?;

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(e) => e,
            Err(e) => {
                debug!("cache entry {key} unreadable, treating as miss: {e}");
                return None;
            }
        };

        if entry.version != CACHE_SCHEMA_VERSION {
            debug!(
                "cache entry {key} has version {}, want {CACHE_SCHEMA_VERSION}; miss",
                entry.version
            );
            return None;
        }

        let age = (self.clock)() - entry.computed_at;
        if !allow_expired && age > Duration::hours(entry.ttl_hours) {
            debug!("cache entry {key} expired ({}h old); miss", age.num_hours());
            return None;
        }

        Some(entry.payload)
    }

    pub fn set<T: Serialize>(
        &self,
        namespace: &str,
        subject: &str,
        payload: &T,
        ttl_hours: i64,
    ) -> Result<()> {
        let entry = CacheEntry {
            version: CACHE_SCHEMA_VERSION.to_string(),
            computed_at: (self.clock)(),
            ttl_hours,
            payload,
        };
        let bytes = serde_json::to_vec(&entry)?;
        self.store.set(&Self::key(namespace, subject), &bytes)
    }

    pub fn invalidate(&self, namespace: &str, subject: &str) -> Result<()> {
        self.store.delete(&Self::key(namespace, subject))
    }

    pub fn invalidate_all(&self, subject: &str) -> Result<()> {
        for namespace in ns::ALL {
            self.invalidate(namespace, subject)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn frozen_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn two_days_later() -> DateTime<Utc> {
        frozen_now() + Duration::days(2)
    }

    #[test]
    fn get_after_set_returns_identical_payload() {
        let cache = AnalysisCache::new(Box::new(MemoryStore::default()));
        cache.set(ns::TIMING, "alice", &vec![1u32, 2, 3], 12).unwrap();

        let got: Vec<u32> = cache.get(ns::TIMING, "alice").unwrap();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        let store = MemoryStore::default();
        let writer = AnalysisCache::with_clock(Box::new(store), frozen_now);
        writer.set(ns::TIMING, "alice", &42u32, 12).unwrap();

        // Move the clock past the TTL by re-wrapping the same store.
        let AnalysisCache { store, .. } = writer;
        let reader = AnalysisCache::with_clock(store, two_days_later);
        assert_eq!(reader.get::<u32>(ns::TIMING, "alice"), None);
        // Stale read still sees it.
        assert_eq!(reader.get_stale::<u32>(ns::TIMING, "alice"), Some(42));
    }

    #[test]
    fn version_mismatch_reads_as_absent_even_stale() {
        let store = MemoryStore::default();
        let entry = serde_json::json!({
            "version": "2",
            "computed_at": "2026-01-10T12:00:00Z",
            "ttl_hours": 9999,
            "payload": 42
        });
        store
            .set("timing:alice", &serde_json::to_vec(&entry).unwrap())
            .unwrap();

        let cache = AnalysisCache::with_clock(Box::new(store), frozen_now);
        assert_eq!(cache.get::<u32>(ns::TIMING, "alice"), None);
        assert_eq!(cache.get_stale::<u32>(ns::TIMING, "alice"), None);
    }

    #[test]
    fn corrupt_entry_reads_as_absent() {
        let store = MemoryStore::default();
        store.set("timing:alice", b"not json").unwrap();
        let cache = AnalysisCache::new(Box::new(store));
        assert_eq!(cache.get::<u32>(ns::TIMING, "alice"), None);
    }

    #[test]
    fn invalidate_all_clears_every_namespace() {
        let cache = AnalysisCache::new(Box::new(MemoryStore::default()));
        for namespace in ns::ALL {
            cache.set(namespace, "alice", &1u32, 12).unwrap();
        }
        cache.invalidate_all("alice").unwrap();
        for namespace in ns::ALL {
            assert_eq!(cache.get::<u32>(namespace, "alice"), None);
        }
    }
}
