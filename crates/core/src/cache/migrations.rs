//! Schema for cache partitions, their entries and the persisted app state.
//!
//! `001` creates `partitions` and `entries`. Entries reference their partition
//! by name with `ON DELETE CASCADE`, so removing a partition row removes
//! everything stored in it. `002` adds the single-row-per-key `app_state`
//! table behind the feed state.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Schema steps in application order, tagged with the version they bring the
/// database to.
const SCHEMA: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_partitions.sql")),
    (2, include_str!("../../migrations/002_app_state.sql")),
];

/// Bring the schema up to the latest version.
///
/// Pending steps are applied in one transaction and recorded in
/// `_schema_version`; a database already at the latest version is untouched.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )?;

        let applied: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _schema_version", [], |row| row.get(0))?;

        let pending: Vec<_> = SCHEMA.iter().filter(|(version, _)| *version > applied).collect();
        if pending.is_empty() {
            return Ok(());
        }

        let tx = conn.transaction()?;
        for (version, sql) in pending {
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("schema {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _schema_version (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_exists(conn: &Connection, table: &'static str) -> bool {
        conn.call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                params![table],
                |row| row.get(0),
            )
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_schema_creates_cache_and_state_tables() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        for table in ["partitions", "entries", "app_state"] {
            assert!(table_exists(&conn, table).await, "missing table {table}");
        }

        let version: i64 = conn
            .call(|conn| conn.query_row("SELECT MAX(version) FROM _schema_version", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(version, SCHEMA.len() as i64);
    }

    #[tokio::test]
    async fn test_deleting_partition_cascades_to_entries() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| conn.execute_batch("PRAGMA foreign_keys=ON;")).await.unwrap();
        run(&conn).await.unwrap();

        let remaining: i64 = conn
            .call(|conn| {
                conn.execute_batch(
                    "INSERT INTO partitions (name, created_at) VALUES ('static-v1', 'now');
                     INSERT INTO entries (partition, key_hash, method, url, status, headers_json, body, stored_at)
                     VALUES ('static-v1', 'h', 'GET', 'http://localhost:8080/', 200, '[]', x'', 'now');
                     DELETE FROM partitions WHERE name = 'static-v1';",
                )?;
                conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
