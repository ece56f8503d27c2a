//! Persistent local ContentStore on SQLite.
//!
//! Blobs live in a single table keyed by CID next to their digest, so a
//! resolve can detect on-disk corruption. rusqlite is synchronous; every call
//! runs on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use aemula_core::ContentAddress;
use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::address::{compute_cid, digest_hex};
use crate::error::{PublishError, ResolveError, Result, StoreError};
use crate::migration::migrate;
use crate::traits::{ContentStore, PublishMetadata};

/// Blob store backed by one SQLite connection. Calls serialize on it.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// A throwaway database that lives as long as the store.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored blobs.
    pub async fn count(&self) -> Result<usize> {
        self.blocking(|conn| {
            conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get::<_, i64>(0))
        })
        .await
        .map(|n| n as usize)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || {
            // SQLite rolls back a statement interrupted by a panic, so a
            // poisoned guard is still usable.
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard)
        })
        .await;

        match joined {
            Ok(result) => Ok(result?),
            Err(e) => Err(StoreError::Io(std::io::Error::other(format!(
                "sqlite task failed: {}",
                e
            )))),
        }
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> std::result::Result<ContentAddress, PublishError> {
        let cid = compute_cid(blob);
        let digest = digest_hex(blob);
        let content = blob.to_vec();
        let name = meta.name.clone();
        let content_type = meta.content_type.clone();
        let key = cid.as_str().to_string();

        let inserted = self
            .blocking(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO blobs
                        (cid, name, content_type, digest, size, content, published_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, CAST(strftime('%s', 'now') AS INTEGER) * 1000)",
                    params![key, name, content_type, digest, content.len() as i64, content],
                )
            })
            .await
            .map_err(|e| PublishError::UploadFailed(e.to_string()))?;

        debug!(%cid, name = %meta.name, new = inserted > 0, "stored blob in sqlite");
        Ok(cid)
    }

    async fn resolve(&self, cid: &ContentAddress) -> std::result::Result<Bytes, ResolveError> {
        let key = cid.as_str().to_string();

        let row: Option<(Vec<u8>, String)> = self
            .blocking(move |conn| {
                conn.query_row(
                    "SELECT content, digest FROM blobs WHERE cid = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
            })
            .await
            .map_err(|e| ResolveError::Unavailable {
                cid: cid.clone(),
                reason: e.to_string(),
            })?;

        let (content, digest) = row.ok_or_else(|| ResolveError::NotFound(cid.clone()))?;

        if digest_hex(&content) != digest {
            return Err(ResolveError::Malformed {
                cid: cid.clone(),
                reason: "stored content does not match its digest".into(),
            });
        }

        Ok(Bytes::from(content))
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
