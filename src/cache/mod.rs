//! Revalidation manifest
//!
//! Records when each route was last generated so that pages can be
//! regenerated once they are older than their revalidation window. The
//! manifest lives next to the site config and survives restarts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::RevalidateConfig;

/// Cache directory name
pub const CACHE_DIR: &str = ".spacetraveling-cache";

/// Cache file name
const CACHE_FILE: &str = ".spacetraveling-cache/db.json";

/// Represents a generated route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Generation time (unix seconds)
    pub generated_at: i64,
    /// Output path relative to public dir
    pub output_path: String,
}

/// How a route's generated page relates to its revalidation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Missing,
}

/// Cache database for tracking generated routes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Entries keyed by route (`/`, `/post/{uid}`)
    pub routes: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            match serde_json::from_str::<CacheDb>(&content) {
                Ok(cache) if cache.version == Self::VERSION => return cache,
                Ok(_) => tracing::info!("Cache version mismatch, starting fresh"),
                Err(e) => tracing::warn!("Ignoring unreadable cache {:?}: {}", cache_path, e),
            }
        }
        Self::new()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(CACHE_DIR);
        fs::create_dir_all(&cache_dir)?;

        let cache_path = base_dir.join(CACHE_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Record that `route` was generated at `now`
    pub fn record(&mut self, route: &str, output_path: &str, now: i64) {
        self.routes.insert(
            route.to_string(),
            CacheEntry {
                generated_at: now,
                output_path: output_path.to_string(),
            },
        );
    }

    /// Forget a route
    pub fn remove(&mut self, route: &str) -> Option<CacheEntry> {
        self.routes.remove(route)
    }

    /// Classify `route` against a window of `max_age` seconds
    pub fn freshness(&self, route: &str, max_age: u64, now: i64) -> Freshness {
        match self.routes.get(route) {
            None => Freshness::Missing,
            Some(entry) => {
                let age = now.saturating_sub(entry.generated_at);
                // A negative age means the clock moved backwards
                if age < 0 || (age as u64) < max_age {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                }
            }
        }
    }
}

/// Revalidation window of a route, in seconds
pub fn revalidate_window(route: &str, config: &RevalidateConfig) -> u64 {
    if route == "/" {
        config.index
    } else {
        config.post
    }
}

/// Current time as unix seconds
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
