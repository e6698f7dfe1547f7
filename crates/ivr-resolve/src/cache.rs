//! Cache for AI-enhanced resolution results.
//!
//! Keyed by manufacturer plus a canonical hash of the source data, so
//! identical intake episodes never pay the AI cost twice within the TTL.
//! Caching affects latency only: a hit returns the same outcome the miss
//! path would have produced.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use ivr_model::ResolutionOutcome;
use ivr_schema::manufacturer_slug;

/// Default time-to-live for cached enhancement results.
pub const DEFAULT_ENHANCEMENT_TTL_HOURS: i64 = 6;

/// Cache key for one `(manufacturer, source data)` resolution.
pub fn enhancement_cache_key(manufacturer: &str, source_hash: &str) -> String {
    format!("{}:{source_hash}", manufacturer_slug(manufacturer))
}

/// Storage for enhancement results, injected into the resolution engine.
///
/// Backend failures surface as errors; the engine demotes the resolution
/// to the lenient tier when a lookup fails and keeps the computed outcome
/// when a store fails.
pub trait EnhancementCache: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<ResolutionOutcome>>;
    fn put(&self, key: &str, outcome: ResolutionOutcome) -> anyhow::Result<()>;

    /// Drops expired entries. Implementations may also prune lazily.
    fn purge_expired(&self);
}

/// In-memory TTL cache.
pub struct MemoryEnhancementCache {
    ttl: Duration,
    entries: Mutex<BTreeMap<String, (DateTime<Utc>, ResolutionOutcome)>>,
}

impl MemoryEnhancementCache {
    pub fn new() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_ENHANCEMENT_TTL_HOURS),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for MemoryEnhancementCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancementCache for MemoryEnhancementCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<ResolutionOutcome>> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        let Some((stored_at, outcome)) = entries.get(key) else {
            return Ok(None);
        };
        if Utc::now() - *stored_at > self.ttl {
            return Ok(None);
        }
        Ok(Some(outcome.clone()))
    }

    fn put(&self, key: &str, outcome: ResolutionOutcome) -> anyhow::Result<()> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), (Utc::now(), outcome));
        Ok(())
    }

    fn purge_expired(&self) {
        let cutoff = Utc::now() - self.ttl;
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .retain(|_, (stored_at, _)| *stored_at > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use ivr_model::{CompletenessMetrics, ValidationResult, ValidationStrategy};

    use super::*;

    fn outcome() -> ResolutionOutcome {
        ResolutionOutcome {
            manufacturer: "MEDLIFE SOLUTIONS".to_string(),
            data: BTreeMap::new(),
            mappings: Default::default(),
            validation: ValidationResult::passing(ValidationStrategy::Adaptive),
            completeness: CompletenessMetrics::empty(),
            ai_enhanced: true,
        }
    }

    #[test]
    fn stores_and_returns_outcomes() {
        let cache = MemoryEnhancementCache::new();
        let key = enhancement_cache_key("MEDLIFE SOLUTIONS", "abc123");
        assert!(cache.get(&key).expect("cache get").is_none());
        cache.put(&key, outcome()).expect("cache put");
        assert_eq!(cache.get(&key).expect("cache get"), Some(outcome()));
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = MemoryEnhancementCache::new().with_ttl(Duration::zero());
        let key = enhancement_cache_key("MEDLIFE SOLUTIONS", "abc123");
        cache.put(&key, outcome()).expect("cache put");
        assert!(cache.get(&key).expect("cache get").is_none());
        cache.purge_expired();
    }

    #[test]
    fn key_normalizes_manufacturer_spelling() {
        assert_eq!(
            enhancement_cache_key("MEDLIFE SOLUTIONS", "h"),
            enhancement_cache_key("medlife solutions", "h"),
        );
    }
}
