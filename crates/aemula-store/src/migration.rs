//! Schema migrations for the SQLite blob store.
//!
//! The schema version lives in SQLite's `user_version` pragma. Step `i` of
//! [`MIGRATIONS`] moves the schema from version `i` to `i + 1`; all pending
//! steps run in one transaction.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Schema steps, oldest first.
const MIGRATIONS: &[&str] = &[
    // v1: one row per content address
    r#"
    CREATE TABLE blobs (
        cid TEXT PRIMARY KEY,             -- CIDv1 (raw, sha2-256), base32
        name TEXT NOT NULL,               -- file name given at first publish
        content_type TEXT NOT NULL,
        digest TEXT NOT NULL,             -- hex sha2-256 of content
        size INTEGER NOT NULL,
        content BLOB NOT NULL,
        published_at INTEGER NOT NULL     -- Unix ms
    );

    CREATE INDEX idx_blobs_published ON blobs(published_at);
    "#,
];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{} is newer than this build (v{})",
            found, CURRENT_VERSION
        )));
    }
    if found == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        tx.execute_batch(sql)?;
        debug!(version = step + 1, "applied blob store migration");
    }
    tx.pragma_update(None, "user_version", CURRENT_VERSION)?;
    tx.commit()?;

    Ok(())
}
