//! Keyed locks for member submissions and tie-breaker creation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serializes work per key (one electorate member, or one tie-breaker
/// parent) while unrelated keys proceed in parallel. Idle entries are
/// dropped as soon as nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct MemberLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemberLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let result = {
            let _held = slot.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        drop(slot);
        // Clones are only taken and released under the map lock.
        if slots.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(key);
        }
        result
    }

    /// Keys currently held or awaited.
    pub fn active(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}
