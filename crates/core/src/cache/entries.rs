//! Entry CRUD operations.
//!
//! Entries are keyed by request identity within a partition. Writes use
//! UPSERT semantics so a key holds at most one stored response, and the
//! last write wins.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Identity of a cacheable request: method plus canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into().to_ascii_uppercase(), url: url.into() }
    }

    /// Shorthand for a `GET` identity.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Storage key (hex SHA-256 of method and URL).
    pub fn hash(&self) -> String {
        compute_request_key(&self.method, &self.url)
    }

    /// Only idempotent `GET` requests may be stored.
    pub fn is_storable(&self) -> bool {
        self.method == "GET"
    }
}

/// A response as persisted in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A stored response together with where and when it was stored.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub partition: String,
    pub key: RequestKey,
    pub response: StoredResponse,
    pub stored_at: String,
}

fn ensure_storable(key: &RequestKey) -> Result<(), Error> {
    if key.is_storable() {
        Ok(())
    } else {
        Err(Error::NotCacheable(format!("{} {}", key.method, key.url)))
    }
}

fn upsert_entry(
    conn: &rusqlite::Connection, partition: &str, key: &RequestKey, response: &StoredResponse, now: &str,
) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![partition, now],
    )?;
    conn.execute(
        "INSERT INTO entries (partition, key_hash, method, url, status, headers_json, body, stored_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(partition, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition,
            key.hash(),
            &key.method,
            &key.url,
            response.status,
            headers_json,
            &response.body,
            now
        ],
    )?;
    Ok(())
}

fn decode_response(status: u16, headers_json: &str, body: Vec<u8>) -> Result<StoredResponse, Error> {
    let headers: Vec<(String, String)> = serde_json::from_str(headers_json)?;
    Ok(StoredResponse { status, headers, body })
}

impl CacheDb {
    /// Store a response under the request identity, creating the partition if absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotCacheable` for non-GET requests, or a database error.
    pub async fn put(&self, partition: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        ensure_storable(key)?;
        let partition = partition.to_string();
        let key = key.clone();
        let response = response.clone();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                upsert_entry(&tx, &partition, &key, &response, &now)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch in one transaction. Either every entry is written or none is.
    ///
    /// Returns the number of entries written.
    pub async fn put_all(&self, partition: &str, items: Vec<(RequestKey, StoredResponse)>) -> Result<usize, Error> {
        for (key, _) in &items {
            ensure_storable(key)?;
        }
        let partition = partition.to_string();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for (key, response) in &items {
                    upsert_entry(&tx, &partition, key, response, &now)?;
                }
                tx.commit()?;
                Ok(items.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request identity in a single partition.
    pub async fn match_in(&self, partition: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let partition = partition.to_string();
        let key_hash = key.hash();

        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt =
                    conn.prepare("SELECT status, headers_json, body FROM entries WHERE partition = ?1 AND key_hash = ?2")?;

                let result = stmt.query_row(params![partition, key_hash], |row| {
                    Ok((row.get::<_, u16>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?))
                });

                match result {
                    Ok((status, headers_json, body)) => Ok(Some(decode_response(status, &headers_json, body)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request identity across all partitions in creation order.
    pub async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedEntry>, Error> {
        let key_hash = key.hash();

        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.partition, e.method, e.url, e.status, e.headers_json, e.body, e.stored_at
                    FROM entries e JOIN partitions p ON p.name = e.partition
                    WHERE e.key_hash = ?1
                    ORDER BY p.id ASC
                    LIMIT 1",
                )?;

                let result = stmt.query_row(params![key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        RequestKey { method: row.get(1)?, url: row.get(2)? },
                        row.get::<_, u16>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((partition, key, status, headers_json, body, stored_at)) => Ok(Some(CachedEntry {
                        partition,
                        key,
                        response: decode_response(status, &headers_json, body)?,
                        stored_at,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Request identities stored in a partition, oldest write first.
    pub async fn keys(&self, partition: &str) -> Result<Vec<RequestKey>, Error> {
        let partition = partition.to_string();

        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE partition = ?1 ORDER BY stored_at ASC, url ASC")?;
                let rows = stmt.query_map(params![partition], |row| {
                    Ok(RequestKey { method: row.get(0)?, url: row.get(1)? })
                })?;
                let mut keys = Vec::new();
                for key in rows {
                    keys.push(key?);
                }
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> StoredResponse {
        StoredResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/javascript".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("http://localhost:8080/app.js");

        db.put("static-v1", &key, &make_response("console.log(1)")).await.unwrap();

        let stored = db.match_in("static-v1", &key).await.unwrap().unwrap();
        assert_eq!(stored.body, b"console.log(1)");
        assert_eq!(stored.header("Content-Type"), Some("text/javascript"));

        let equivalent = RequestKey::new("get", "http://localhost:8080/app.js");
        assert!(db.match_in("static-v1", &equivalent).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("http://localhost:8080/missing.css");
        assert!(db.match_in("static-v1", &key).await.unwrap().is_none());
        assert!(db.match_any(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_twice_keeps_one_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("http://localhost:8080/style.css");

        db.put("static-v1", &key, &make_response("old")).await.unwrap();
        db.put("static-v1", &key, &make_response("new")).await.unwrap();

        let keys = db.keys("static-v1").await.unwrap();
        assert_eq!(keys, vec![key.clone()]);
        let stored = db.match_in("static-v1", &key).await.unwrap().unwrap();
        assert_eq!(stored.body, b"new");
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::new("POST", "http://localhost:8080/api/like");
        let result = db.put("dynamic-v1", &key, &make_response("{}")).await;
        assert!(matches!(result, Err(Error::NotCacheable(_))));
    }

    #[tokio::test]
    async fn test_match_any_prefers_oldest_partition() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("http://localhost:8080/index.html");

        db.put("static-v1", &key, &make_response("static")).await.unwrap();
        db.put("dynamic-v1", &key, &make_response("dynamic")).await.unwrap();

        let entry = db.match_any(&key).await.unwrap().unwrap();
        assert_eq!(entry.partition, "static-v1");
        assert_eq!(entry.response.body, b"static");
    }

    #[tokio::test]
    async fn test_put_all_is_atomic() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let items = vec![
            (RequestKey::get("http://localhost:8080/"), make_response("root")),
            (RequestKey::new("POST", "http://localhost:8080/form"), make_response("nope")),
        ];

        assert!(db.put_all("static-v1", items).await.is_err());
        assert!(db.keys("static-v1").await.unwrap().is_empty());

        let items = vec![
            (RequestKey::get("http://localhost:8080/"), make_response("root")),
            (RequestKey::get("http://localhost:8080/app.js"), make_response("app")),
        ];
        assert_eq!(db.put_all("static-v1", items).await.unwrap(), 2);
        assert_eq!(db.keys("static-v1").await.unwrap().len(), 2);
    }
}
