use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::rate_limit::RateLimitEntry;

/// Table of rate limit windows, one entry per identifier.
///
/// `update` is the read-modify-write the limiter relies on. The default
/// implementation is a plain `get` then `set` and is only safe when callers
/// never race on one identifier; shared stores must override it.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, identifier: &str) -> Option<RateLimitEntry>;

    fn set(&self, entry: RateLimitEntry);

    /// Removes entries whose window closed at or before `now_ms`.
    fn sweep(&self, now_ms: i64) -> usize;

    fn len(&self) -> usize;

    /// Hands the current entry to `apply` and stores whatever it returns.
    /// `None` leaves the table untouched.
    fn update(
        &self,
        identifier: &str,
        apply: &mut dyn FnMut(Option<&RateLimitEntry>) -> Option<RateLimitEntry>,
    ) {
        let current = self.get(identifier);
        if let Some(next) = apply(current.as_ref()) {
            self.set(next);
        }
    }
}

// In-process store, updates run under the identifier's shard lock
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|entry| entry.value().clone())
    }

    fn set(&self, entry: RateLimitEntry) {
        self.entries.insert(entry.identifier.clone(), entry);
    }

    fn sweep(&self, now_ms: i64) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now_ms);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn update(
        &self,
        identifier: &str,
        apply: &mut dyn FnMut(Option<&RateLimitEntry>) -> Option<RateLimitEntry>,
    ) {
        match self.entries.entry(identifier.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if let Some(next) = apply(Some(occupied.get())) {
                    occupied.insert(next);
                }
            }
            Entry::Vacant(vacant) => {
                if let Some(next) = apply(None) {
                    vacant.insert(next);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use crate::rate_limit::tests::ManualClock;
    use crate::rate_limit::{RateLimitPolicy, RateLimiter};

    fn entry(identifier: &str, count: u32, window_reset_at_ms: i64) -> RateLimitEntry {
        RateLimitEntry {
            identifier: identifier.to_owned(),
            count,
            window_reset_at_ms,
        }
    }

    // get/set only, relies on the default update
    #[derive(Default)]
    struct HashMapStore(Mutex<HashMap<String, RateLimitEntry>>);

    impl RateLimitStore for HashMapStore {
        fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
            self.0.lock().unwrap().get(identifier).cloned()
        }

        fn set(&self, entry: RateLimitEntry) {
            self.0.lock().unwrap().insert(entry.identifier.clone(), entry);
        }

        fn sweep(&self, now_ms: i64) -> usize {
            let mut entries = self.0.lock().unwrap();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(now_ms));
            before - entries.len()
        }

        fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    #[test]
    fn set_replaces_the_existing_entry() {
        let store = MemoryStore::new();
        store.set(entry("contact:a", 1, 100));
        store.set(entry("contact:a", 2, 100));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("contact:a"), Some(entry("contact:a", 2, 100)));
    }

    #[test]
    fn update_returning_none_leaves_table_alone() {
        let store = MemoryStore::new();
        store.update("contact:a", &mut |_: Option<&RateLimitEntry>| None);
        assert_eq!(store.len(), 0);

        store.set(entry("contact:a", 3, 100));
        store.update("contact:a", &mut |current: Option<&RateLimitEntry>| {
            assert_eq!(current.map(|e| e.count), Some(3));
            None
        });
        assert_eq!(store.get("contact:a"), Some(entry("contact:a", 3, 100)));
    }

    #[test]
    fn sweep_reports_removed_count() {
        let store = MemoryStore::new();
        store.set(entry("a", 1, 100));
        store.set(entry("b", 1, 200));
        store.set(entry("c", 1, 300));

        assert_eq!(store.sweep(200), 2);
        assert_eq!(store.get("c"), Some(entry("c", 1, 300)));
        assert_eq!(store.sweep(200), 0);
    }

    #[test]
    fn limiter_works_over_a_get_set_store() {
        let store = Arc::new(HashMapStore::default());
        let clock = ManualClock::at(0);
        let limiter = RateLimiter::new(store.clone(), clock.clone());
        let policy = RateLimitPolicy::new(2, 1000);

        assert!(limiter.check("chatbot:a", &policy).unwrap().allowed);
        assert!(limiter.check("chatbot:a", &policy).unwrap().allowed);
        assert!(!limiter.check("chatbot:a", &policy).unwrap().allowed);
        assert_eq!(store.get("chatbot:a"), Some(entry("chatbot:a", 2, 1000)));

        clock.set(1000);
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(store.len(), 0);
    }
}
