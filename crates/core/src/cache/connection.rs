//! Database connection management with pragma configuration.
//!
//! Opens the SQLite database backing all cache partitions and the persisted
//! app state, applies pragmas (WAL, foreign keys for entry cascade) and runs
//! migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning is cheap and shares the connection.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::configure(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::configure(conn).await
    }

    async fn configure(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Make every entry write fail while reads keep working.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn reject_entry_writes(&self) -> Result<(), Error> {
        self.fault("CREATE TRIGGER reject_entry_writes BEFORE INSERT ON entries BEGIN SELECT RAISE(ABORT, 'disk full'); END;")
            .await
    }

    /// Drop the entries table so that every entry read and write fails.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn drop_entries_table(&self) -> Result<(), Error> {
        self.fault("DROP TABLE entries").await
    }

    #[cfg(any(test, feature = "test-util"))]
    async fn fault(&self, sql: &'static str) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
