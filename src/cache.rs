//! SQLite-based HTTP response cache
//!
//! Stores whole responses keyed by full request URL, with a global expiry
//! and per-URL overrides. Invalidation is explicit and per-URL; there is no
//! finer-grained caching anywhere in the library.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};

use crate::config::CacheConfig;
use crate::error::{ApiError, Result};

/// URL-keyed cache of HTTP responses
pub struct ResponseCache {
    conn: Connection,
    config: CacheConfig,
}

/// A response served from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
    pub status: u16,
    pub body: String,
}

impl ResponseCache {
    /// Open or create the cache at its default location
    pub fn open(config: CacheConfig) -> Result<Self> {
        let path = Self::default_path(&config.name)?;
        Self::open_at(&path, config)
    }

    /// Open or create the cache at a specific path
    pub fn open_at(path: &Path, config: CacheConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::Cache {
                message: e.to_string(),
            })?;
        }

        let result = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        );

        let conn = match result {
            Ok(conn) => conn,
            Err(e) => {
                // If corrupted, delete and recreate
                tracing::warn!("Response cache corrupted, recreating: {}", e);
                if path.exists() {
                    std::fs::remove_file(path).map_err(|e| ApiError::Cache {
                        message: e.to_string(),
                    })?;
                }
                Connection::open(path)?
            }
        };

        let cache = Self { conn, config };
        cache.init()?;
        Ok(cache)
    }

    /// Open an in-memory cache (for testing)
    pub fn open_memory(config: CacheConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn, config };
        cache.init()?;
        Ok(cache)
    }

    /// Default cache path for a database name
    pub fn default_path(name: &str) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().ok_or_else(|| ApiError::Cache {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("hubview").join(format!("{}.db", name)))
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                url TEXT PRIMARY KEY,
                status INTEGER NOT NULL,
                body TEXT NOT NULL,
                expires_at INTEGER
            );
            "#,
        )?;

        Ok(())
    }

    /// Look up an unexpired cached response. Expired rows are evicted on read.
    pub fn get(&self, url: &str) -> Result<Option<CachedEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT status, body, expires_at FROM responses WHERE url = ?1",
                [url],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((_, _, Some(expires_at))) if expires_at <= now_unix() => {
                self.delete_url(url)?;
                Ok(None)
            }
            Some((status, body, _)) => Ok(Some(CachedEntry { status, body })),
            None => Ok(None),
        }
    }

    /// Store a response, computing its expiry from the cache settings
    pub fn put(&self, url: &str, status: u16, body: &str) -> Result<()> {
        let expires_at = self
            .config
            .expiry_for(url)
            .map(|d| now_unix() + d.as_secs() as i64);

        self.conn.execute(
            r#"
            INSERT INTO responses (url, status, body, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(url) DO UPDATE SET
                status = excluded.status,
                body = excluded.body,
                expires_at = excluded.expires_at
            "#,
            params![url, status, body, expires_at],
        )?;

        Ok(())
    }

    /// Enumerate all cached request URLs
    pub fn urls(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM responses")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    /// Delete a single cached URL
    pub fn delete_url(&self, url: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM responses WHERE url = ?1", [url])?;
        Ok(())
    }

    /// Clear all cached responses
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM responses", [])?;
        Ok(())
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn memory_cache(config: CacheConfig) -> ResponseCache {
        ResponseCache::open_memory(config).unwrap()
    }

    #[test]
    fn test_put_and_get() {
        let cache = memory_cache(CacheConfig::default());
        cache
            .put("https://api.github.com/repos/a/b", 200, "{}")
            .unwrap();

        let entry = cache.get("https://api.github.com/repos/a/b").unwrap();
        assert_eq!(
            entry,
            Some(CachedEntry {
                status: 200,
                body: "{}".to_string()
            })
        );

        assert!(cache.get("https://api.github.com/repos/a/c").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_existing_url() {
        let cache = memory_cache(CacheConfig::default());
        cache.put("https://example.com/x", 200, "old").unwrap();
        cache.put("https://example.com/x", 200, "new").unwrap();

        let entry = cache.get("https://example.com/x").unwrap().unwrap();
        assert_eq!(entry.body, "new");
        assert_eq!(cache.urls().unwrap().len(), 1);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        let config = CacheConfig {
            expire_after: Some(Duration::from_secs(0)),
            ..CacheConfig::default()
        };
        let cache = memory_cache(config);
        cache.put("https://example.com/x", 200, "{}").unwrap();

        // Zero-second expiry means the entry is already stale.
        assert!(cache.get("https://example.com/x").unwrap().is_none());
        assert!(cache.urls().unwrap().is_empty());
    }

    #[test]
    fn test_per_url_override_beats_global_expiry() {
        let config = CacheConfig {
            expire_after: Some(Duration::from_secs(0)),
            urls_expire_after: vec![("/tags".to_string(), Some(Duration::from_secs(3600)))],
            ..CacheConfig::default()
        };
        let cache = memory_cache(config);

        cache
            .put("https://api.github.com/repos/a/b/tags", 200, "[]")
            .unwrap();
        cache
            .put("https://api.github.com/repos/a/b/branches", 200, "[]")
            .unwrap();

        // The /tags override keeps its entry alive; the global zero expiry
        // drops the other one.
        assert!(
            cache
                .get("https://api.github.com/repos/a/b/tags")
                .unwrap()
                .is_some()
        );
        assert!(
            cache
                .get("https://api.github.com/repos/a/b/branches")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_urls_delete_and_clear() {
        let cache = memory_cache(CacheConfig::default());
        cache.put("https://example.com/a", 200, "1").unwrap();
        cache.put("https://example.com/b", 200, "2").unwrap();

        let mut urls = cache.urls().unwrap();
        urls.sort();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);

        cache.delete_url("https://example.com/a").unwrap();
        assert_eq!(cache.urls().unwrap(), vec!["https://example.com/b"]);

        cache.clear().unwrap();
        assert!(cache.urls().unwrap().is_empty());
    }

    #[test]
    fn test_open_at_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let cache = ResponseCache::open_at(&path, CacheConfig::default()).unwrap();
        cache.put("https://example.com/a", 200, "1").unwrap();

        assert!(path.exists());
    }
}
