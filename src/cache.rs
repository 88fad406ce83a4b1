//! File-based caching for index API responses.
//!
//! Latest-release lookups hit the package index once per distribution; this
//! cache keeps those responses on disk with a TTL so repeated scans stay
//! fast and polite to the index.
//!
//! # Example
//!
//! ```no_run
//! use distscan::Cache;
//!
//! let cache = Cache::new();
//! cache.set("pypi_latest_requests", &"2.32.3".to_string()).unwrap();
//! let value: Option<String> = cache.get("pypi_latest_requests");
//! ```

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::platform::cache_dir;

/// Default cache TTL in hours.
const CACHE_TTL_HOURS: u64 = 24;

/// A file-based cache with TTL support.
///
/// Values are stored as JSON files in the cache directory. Each entry
/// expires after the configured TTL period.
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Creates a new cache with the default 24-hour TTL.
    pub fn new() -> Self {
        Self {
            dir: cache_dir(),
            ttl: Duration::from_secs(CACHE_TTL_HOURS * 3600),
        }
    }

    /// Creates a new cache with a custom TTL.
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self {
            dir: cache_dir(),
            ttl: Duration::from_secs(hours * 3600),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Converts a cache key to a safe filename.
    fn cache_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }

    /// Retrieves a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.cache_path(key);

        if !path.exists() {
            return None;
        }

        if let Ok(metadata) = fs::metadata(&path) {
            if let Ok(modified) = metadata.modified() {
                if let Ok(elapsed) = SystemTime::now().duration_since(modified) {
                    if elapsed > self.ttl {
                        let _ = fs::remove_file(&path);
                        return None;
                    }
                }
            }
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Stores a value in the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created or
    /// the file cannot be written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.cache_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Clears all cached entries.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)?.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    let _ = fs::remove_file(path);
                }
            }
        }
        Ok(())
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
