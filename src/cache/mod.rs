// Response cache module.
// Defines the cache capability the client depends on and the bundled implementations.

use std::sync::{Arc, OnceLock};

pub mod disk;
pub mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;

/// Storage capability for raw API responses.
///
/// `store` returns the canonical value for the key: whatever it returns is
/// what the client's `query` hands back to the caller, so an implementation
/// that normalizes or transforms on write rewrites the response callers see.
pub trait ResponseCache: Send + Sync {
    /// Look up a previously stored response.
    ///
    /// `None` means no entry exists; a cached empty body comes back as
    /// `Some("")` and is a valid hit.
    fn fetch(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key` and return the canonical value.
    fn store(&self, key: &str, value: String) -> String;
}

/// Cache that never stores or returns anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl ResponseCache for NullCache {
    fn fetch(&self, _key: &str) -> Option<String> {
        None
    }

    fn store(&self, _key: &str, value: String) -> String {
        value
    }
}

/// Factory producing the process-wide default cache.
pub type CacheFactory = fn() -> Arc<dyn ResponseCache>;

static DEFAULT_CACHE: OnceLock<CacheFactory> = OnceLock::new();

/// Install the process-wide default cache factory.
///
/// Clients capture the default at construction time. The slot accepts a
/// single writer; returns `false` when a factory was already installed.
pub fn install_default_cache(factory: CacheFactory) -> bool {
    DEFAULT_CACHE.set(factory).is_ok()
}

/// The current process-wide default cache ([`NullCache`] unless a factory
/// was installed).
pub fn default_cache() -> Arc<dyn ResponseCache> {
    match DEFAULT_CACHE.get() {
        Some(factory) => factory(),
        None => Arc::new(NullCache),
    }
}
