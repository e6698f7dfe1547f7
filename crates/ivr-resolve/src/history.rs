//! History of field names that repeatedly failed to map.
//!
//! The resolution engine records unmappable target names here; the field
//! validator is seeded from a snapshot so known-bad names are rejected
//! without re-running the correction cascade.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// How long an unmappable field name stays blacklisted.
pub const INVALID_FIELD_RETENTION_DAYS: i64 = 30;

/// Store of previously unmappable field names.
///
/// Injected into the resolution engine so deployments can persist the
/// history across sessions; entries expire after a retention window.
pub trait InvalidFieldStore: Send + Sync {
    /// Records a field name that could not be validated or corrected.
    fn record(&self, field: &str);

    /// Whether the field is currently blacklisted.
    fn contains(&self, field: &str) -> bool;

    /// Current blacklist, for seeding a validator.
    fn snapshot(&self) -> BTreeSet<String>;
}

impl<S: InvalidFieldStore + ?Sized> InvalidFieldStore for std::sync::Arc<S> {
    fn record(&self, field: &str) {
        (**self).record(field);
    }

    fn contains(&self, field: &str) -> bool {
        (**self).contains(field)
    }

    fn snapshot(&self) -> BTreeSet<String> {
        (**self).snapshot()
    }
}

/// In-memory store with time-based expiry, pruned on access.
pub struct MemoryInvalidFieldStore {
    retention: Duration,
    entries: Mutex<BTreeMap<String, DateTime<Utc>>>,
}

impl MemoryInvalidFieldStore {
    pub fn new() -> Self {
        Self {
            retention: Duration::days(INVALID_FIELD_RETENTION_DAYS),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    fn prune(&self, entries: &mut BTreeMap<String, DateTime<Utc>>) {
        let cutoff = Utc::now() - self.retention;
        entries.retain(|_, recorded| *recorded > cutoff);
    }
}

impl Default for MemoryInvalidFieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidFieldStore for MemoryInvalidFieldStore {
    fn record(&self, field: &str) {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        self.prune(&mut entries);
        entries.insert(field.to_string(), Utc::now());
    }

    fn contains(&self, field: &str) -> bool {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        self.prune(&mut entries);
        entries.contains_key(field)
    }

    fn snapshot(&self) -> BTreeSet<String> {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        self.prune(&mut entries);
        entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_fields_appear_in_snapshot() {
        let store = MemoryInvalidFieldStore::new();
        store.record("Quarterly Revenue");
        assert!(store.contains("Quarterly Revenue"));
        assert!(store.snapshot().contains("Quarterly Revenue"));
    }

    #[test]
    fn entries_expire_after_retention() {
        let store = MemoryInvalidFieldStore::new().with_retention(Duration::zero());
        store.record("Ephemeral Field");
        assert!(!store.contains("Ephemeral Field"));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn re_recording_refreshes_expiry() {
        let store = MemoryInvalidFieldStore::new();
        store.record("Sticky Field");
        store.record("Sticky Field");
        assert_eq!(store.snapshot().len(), 1);
    }
}
