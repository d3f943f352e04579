//! `ResponseStore` operations on the SQLite backend.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::SqliteStore;
use super::{CacheEntry, ResponseStore};
use crate::Error;
use crate::request::Response;

const INSERT_NAMESPACE: &str = "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)";

const UPSERT_ENTRY: &str = "INSERT INTO entries (
        namespace, key, method, url, final_url, status_code, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(namespace, key) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        final_url = excluded.final_url,
        status_code = excluded.status_code,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// Row shape shared by single and batch writes.
struct EntryRow {
    key: String,
    method: String,
    url: String,
    final_url: String,
    status_code: i64,
    headers_json: String,
    body: Vec<u8>,
    stored_at: String,
}

impl TryFrom<CacheEntry> for EntryRow {
    type Error = Error;

    fn try_from(entry: CacheEntry) -> Result<Self, Error> {
        Ok(Self {
            headers_json: serde_json::to_string(&entry.response.headers)?,
            key: entry.key,
            method: entry.method,
            url: entry.url,
            final_url: entry.response.url,
            status_code: i64::from(entry.response.status),
            body: entry.response.body.to_vec(),
            stored_at: entry.stored_at,
        })
    }
}

fn insert_row(conn: &rusqlite::Connection, namespace: &str, row: &EntryRow) -> Result<(), Error> {
    conn.execute(
        UPSERT_ENTRY,
        params![
            namespace,
            &row.key,
            &row.method,
            &row.url,
            &row.final_url,
            row.status_code,
            &row.headers_json,
            &row.body,
            &row.stored_at,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl ResponseStore for SqliteStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(INSERT_NAMESPACE, params![namespace, now])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, Error> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, method, url, final_url, status_code, headers_json, body, stored_at
                     FROM entries WHERE namespace = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![namespace, key], |row| {
                    Ok(EntryRow {
                        key: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        final_url: row.get(3)?,
                        status_code: row.get(4)?,
                        headers_json: row.get(5)?,
                        body: row.get(6)?,
                        stored_at: row.get(7)?,
                    })
                });

                let row = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let status = u16::try_from(row.status_code)
                    .map_err(|_| Error::Store(format!("invalid stored status {}", row.status_code)))?;
                let headers: Vec<(String, String)> = serde_json::from_str(&row.headers_json)?;

                Ok(Some(CacheEntry {
                    key: row.key,
                    method: row.method,
                    url: row.url,
                    response: Response { url: row.final_url, status, headers, body: row.body.into() },
                    stored_at: row.stored_at,
                }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let row = EntryRow::try_from(entry)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(INSERT_NAMESPACE, params![&namespace, now])?;
                insert_row(&tx, &namespace, &row)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let rows = entries.into_iter().map(EntryRow::try_from).collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                // dropping the transaction on error rolls every row back
                let tx = conn.transaction()?;
                tx.execute(INSERT_NAMESPACE, params![&namespace, now])?;
                for row in &rows {
                    insert_row(&tx, &namespace, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![namespace])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}
