//! Row decoding and snapshot bookkeeping shared by the query modules.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row, Transaction};

use crate::error::{PersistenceResultExt, Result};

const SELECT_SNAPSHOT_SQL: &str = "SELECT written_at FROM snapshots WHERE collection = ?1";
const UPSERT_SNAPSHOT_SQL: &str = "INSERT INTO snapshots (collection, written_at) VALUES (?1, ?2) \
     ON CONFLICT(collection) DO UPDATE SET written_at = excluded.written_at";

/// Reads an RFC 3339 timestamp column.
pub(super) fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable RFC 3339 timestamp column.
pub(super) fn optional_timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| {
            text.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Records that `collection` has now been written.
pub(super) fn mark_snapshot(tx: &Transaction<'_>, collection: &str) -> Result<()> {
    tx.execute(
        UPSERT_SNAPSHOT_SQL,
        params![collection, Timestamp::now().to_string()],
    )
    .persist_context("Failed to record snapshot")?;
    Ok(())
}

impl super::Database {
    /// Whether `collection` has ever been written.
    pub(super) fn has_snapshot(&self, collection: &str) -> Result<bool> {
        let written_at: Option<String> = self
            .connection
            .query_row(SELECT_SNAPSHOT_SQL, params![collection], |row| row.get(0))
            .optional()
            .persist_context("Failed to query snapshot marker")?;
        Ok(written_at.is_some())
    }
}
