//! libSQL-backed HTTP response cache.
//!
//! The [`HttpCache`] struct wraps a local libSQL database storing one row per
//! fetched URL. The scraper is strictly sequential, so there is exactly one
//! writer; no locking discipline is needed. The cache can be emptied at the
//! start of a run with [`HttpCache::clear`].

mod migrations;

use std::path::Path;

use chrono::Utc;
use docreport_shared::{DocReportError, Result};
use libsql::{Connection, Database, params};

/// Response cache handle wrapping a libSQL database.
pub struct HttpCache {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl HttpCache {
    /// Open or create a cache database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocReportError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DocReportError::Cache(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| DocReportError::Cache(e.to_string()))?;

        let cache = Self { db, conn };
        cache.run_migrations().await?;
        Ok(cache)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    DocReportError::Cache(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Cache operations
    // -----------------------------------------------------------------------

    /// Look up a cached body for `url`.
    pub async fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let mut rows = self
            .conn
            .query("SELECT body FROM responses WHERE url = ?1", params![url])
            .await
            .map_err(|e| DocReportError::Cache(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let body: Vec<u8> = row
                    .get(0)
                    .map_err(|e| DocReportError::Cache(e.to_string()))?;
                Ok(Some(body))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DocReportError::Cache(e.to_string())),
        }
    }

    /// Store a body for `url` (upserts).
    pub async fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO responses (url, body, fetched_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(url) DO UPDATE SET
                   body = excluded.body,
                   fetched_at = excluded.fetched_at",
                params![url, body.to_vec(), now.as_str()],
            )
            .await
            .map_err(|e| DocReportError::Cache(e.to_string()))?;
        Ok(())
    }

    /// Remove every cached response.
    pub async fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM responses", params![])
            .await
            .map_err(|e| DocReportError::Cache(e.to_string()))?;
        tracing::info!("response cache cleared");
        Ok(())
    }

    /// Number of cached responses.
    pub async fn len(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM responses", params![])
            .await
            .map_err(|e| DocReportError::Cache(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| DocReportError::Cache(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(DocReportError::Cache(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a temp-file cache for testing.
    async fn test_cache(tag: &str) -> HttpCache {
        let tmp = std::env::temp_dir().join(format!(
            "docreport_cache_{tag}_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&tmp);
        HttpCache::open(&tmp).await.expect("open test cache")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let cache = test_cache("migrate").await;
        assert_eq!(cache.schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!(
            "docreport_cache_idem_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&tmp);
        let c1 = HttpCache::open(&tmp).await.expect("first open");
        drop(c1);
        let c2 = HttpCache::open(&tmp).await.expect("second open");
        assert_eq!(c2.schema_version().await, 1);
    }

    #[tokio::test]
    async fn miss_put_hit() {
        let cache = test_cache("roundtrip").await;

        let url = "https://docs.example.org/3/";
        assert!(cache.get(url).await.expect("miss").is_none());

        cache.put(url, b"<html>hello</html>").await.expect("put");
        let body = cache.get(url).await.expect("hit").expect("some body");
        assert_eq!(body, b"<html>hello</html>");
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = test_cache("overwrite").await;
        let url = "https://docs.example.org/3/download.html";

        cache.put(url, b"old").await.unwrap();
        cache.put(url, b"new").await.unwrap();

        let body = cache.get(url).await.unwrap().unwrap();
        assert_eq!(body, b"new");
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let cache = test_cache("clear").await;
        cache.put("https://a.example.org/", b"a").await.unwrap();
        cache.put("https://b.example.org/", b"b").await.unwrap();
        assert_eq!(cache.len().await.unwrap(), 2);

        cache.clear().await.expect("clear");
        assert_eq!(cache.len().await.unwrap(), 0);
        assert!(cache.get("https://a.example.org/").await.unwrap().is_none());
    }
}
