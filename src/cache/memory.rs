// In-memory response cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ResponseCache;

/// Process-local cache backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseCache for MemoryCache {
    fn fetch(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn store(&self, key: &str, value: String) -> String {
        self.entries().insert(key.to_string(), value.clone());
        value
    }
}
