//! Partition lifecycle: open, enumerate, delete, prune.

use super::connection::CacheDb;
use super::entries::{RequestKey, StoredResponse};
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// Name and size of one partition, as reported to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartitionInfo {
    pub name: String,
    pub entries: u64,
}

/// Handle to a named partition.
///
/// Handles are cheap and meant to be opened per operation rather than held.
#[derive(Clone, Debug)]
pub struct Partition {
    name: String,
    db: CacheDb,
}

impl Partition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn put_all(&self, items: Vec<(RequestKey, StoredResponse)>) -> Result<usize, Error> {
        self.db.put_all(&self.name, items).await
    }
}

impl CacheDb {
    /// Open a partition, creating it if absent. Idempotent.
    pub async fn open_partition(&self, name: &str) -> Result<Partition, Error> {
        let owned = name.to_string();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
                    params![owned, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Partition { name: name.to_string(), db: self.clone() })
    }

    /// All existing partition names in creation order.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY id ASC")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for name in rows {
                    names.push(name?);
                }
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a partition (0 if it does not exist).
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE partition = ?1", params![name], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Name and entry count for each of the given partitions.
    pub async fn partition_info(&self, names: &[String]) -> Result<Vec<PartitionInfo>, Error> {
        let mut info = Vec::with_capacity(names.len());
        for name in names {
            info.push(PartitionInfo { name: name.clone(), entries: self.entry_count(name).await? });
        }
        Ok(info)
    }

    /// Delete a partition and all of its entries. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                delete_partition(conn, &name).map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every partition whose name is not in `live`.
    ///
    /// Returns the deleted names in creation order.
    pub async fn prune_except(&self, live: &[String]) -> Result<Vec<String>, Error> {
        let live = live.to_vec();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let tx = conn.transaction()?;
                let existing: Vec<String> = {
                    let mut stmt = tx.prepare("SELECT name FROM partitions ORDER BY id ASC")?;
                    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                    let mut names = Vec::new();
                    for name in rows {
                        names.push(name?);
                    }
                    names
                };

                let doomed: Vec<String> = existing.into_iter().filter(|name| !live.contains(name)).collect();
                for name in &doomed {
                    delete_partition(&tx, name)?;
                }
                tx.commit()?;
                Ok(doomed)
            })
            .await
            .map_err(Error::from)
    }
}

/// Entries go with their partition through `ON DELETE CASCADE`.
fn delete_partition(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])? > 0)
}
