//! Partition entry CRUD operations.
//!
//! A partition is a named, versioned bucket of path -> response entries.
//! All partitions share one table; the partition name column is what gets
//! swept during activation cleanup.

use super::connection::CacheDb;
use crate::Error;
use crate::request::ResourceResponse;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response at rest in a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// RFC3339 write timestamp. Informational only; entries never expire,
    /// version bumps are the sole cache-busting mechanism.
    pub stored_at: String,
}

impl StoredResponse {
    /// Capture a network response for storage (the "clone" before caching).
    pub fn capture(response: &ResourceResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rehydrate into a servable response.
    pub fn into_response(self) -> ResourceResponse {
        ResourceResponse::new(self.status, self.content_type, Bytes::from(self.body))
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<StoredResponse, rusqlite::Error> {
    Ok(StoredResponse {
        status: row.get::<_, i64>(0)? as u16,
        content_type: row.get(1)?,
        body: row.get(2)?,
        stored_at: row.get(3)?,
    })
}

impl CacheDb {
    /// Insert or overwrite a single entry.
    pub async fn put_entry(&self, partition: &str, path: &str, entry: StoredResponse) -> Result<(), Error> {
        let partition = partition.to_string();
        let path = path.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (partition_name, path, status, content_type, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(partition_name, path) DO UPDATE SET
                        status = excluded.status,
                        content_type = excluded.content_type,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        partition,
                        path,
                        entry.status as i64,
                        entry.content_type,
                        entry.body,
                        entry.stored_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write a batch of (partition, path, entry) rows in one transaction.
    ///
    /// Used by precache: either every row lands or none does.
    pub async fn put_entries(&self, batch: Vec<(String, String, StoredResponse)>) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for (partition, path, entry) in &batch {
                    tx.execute(
                        "INSERT INTO entries (partition_name, path, status, content_type, body, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(partition_name, path) DO UPDATE SET
                            status = excluded.status,
                            content_type = excluded.content_type,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                        params![
                            partition,
                            path,
                            entry.status as i64,
                            entry.content_type,
                            entry.body,
                            entry.stored_at
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by partition name and path.
    ///
    /// Returns None on cache miss.
    pub async fn match_entry(&self, partition: &str, path: &str) -> Result<Option<StoredResponse>, Error> {
        let partition = partition.to_string();
        let path = path.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, content_type, body, stored_at
                     FROM entries WHERE partition_name = ?1 AND path = ?2",
                    params![partition, path],
                    row_to_entry,
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a path across all partitions, newest write first.
    ///
    /// Best-effort fallback for pass-through requests when the network fails.
    pub async fn match_any(&self, path: &str) -> Result<Option<StoredResponse>, Error> {
        let path = path.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, content_type, body, stored_at
                     FROM entries WHERE path = ?1
                     ORDER BY stored_at DESC LIMIT 1",
                    params![path],
                    row_to_entry,
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Enumerate all partition names currently stored.
    pub async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT partition_name FROM entries ORDER BY partition_name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a whole partition. Returns the number of deleted entries.
    pub async fn delete_partition(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE partition_name = ?1", params![partition])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries in a partition.
    pub async fn count_entries(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE partition_name = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
