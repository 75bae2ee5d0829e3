// Disk-backed response cache.
// One JSON envelope file per key, optional TTL checking, atomic writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ResponseCache;
use crate::error::Result;

/// Envelope for a cached response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    body: String,
    cached_at: DateTime<Utc>,
}

impl Entry {
    fn new(body: String) -> Self {
        Self {
            body,
            cached_at: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed > ttl
    }
}

/// Filesystem cache storing one JSON file per key.
///
/// IO and decode problems degrade to a cache miss; they never fail a query.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl DiskCache {
    /// Cache rooted at `dir`; entries never expire.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: None,
        }
    }

    /// Cache rooted at `dir` whose entries expire after `ttl`.
    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl: Some(ttl),
        }
    }

    /// Cache rooted at the platform cache directory
    /// (`~/.cache/instagram-api` on Linux).
    pub fn in_project_dirs() -> Option<Self> {
        ProjectDirs::from("", "", "instagram-api").map(|dirs| Self::new(dirs.cache_dir()))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn read_entry(&self, path: &Path) -> Result<Option<Entry>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        let entry: Entry = serde_json::from_str(&contents)?;
        Ok(Some(entry))
    }

    fn write_entry(&self, path: &Path, entry: &Entry) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entry)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

impl ResponseCache for DiskCache {
    fn fetch(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let entry = match self.read_entry(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable cache entry, treating as miss");
                return None;
            }
        };

        if let Some(ttl) = self.ttl {
            if entry.is_expired(ttl) {
                return None;
            }
        }

        Some(entry.body)
    }

    fn store(&self, key: &str, value: String) -> String {
        let path = self.entry_path(key);
        if let Err(err) = self.write_entry(&path, &Entry::new(value.clone())) {
            warn!(path = %path.display(), %err, "failed to write cache entry");
        }
        value
    }
}

/// Sanitize a cache key for use as a filename.
/// Replaces problematic characters with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '&' | '=' => '_',
            _ => c,
        })
        .collect()
}
