//! Stockage SQLite des réponses de l'API
//!
//! Une seule table `api_cache` : la clé est l'URL de la requête, la valeur le
//! corps de la réponse, et `stored_at` l'horodatage en millisecondes Unix.

use crate::{ApiCache, CachedResponse, Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const TABLE_NAME: &str = "api_cache";

/// Cache d'API persistant sur SQLite
#[derive(Debug)]
pub struct SqliteApiCache {
    conn: Mutex<Connection>,
}

impl SqliteApiCache {
    /// Ouvre (ou crée) la base de cache
    ///
    /// Le répertoire parent est créé si nécessaire.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened API cache database");
        Self::init(conn)
    }

    /// Base en mémoire, utile pour les tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
                    key TEXT PRIMARY KEY,
                    data TEXT NOT NULL,
                    stored_at INTEGER NOT NULL
                )"
            ),
            [],
        )?;

        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{TABLE_NAME}_stored_at ON {TABLE_NAME} (stored_at)"
            ),
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Supprime les entrées plus vieilles que `ttl`
    ///
    /// # Returns
    ///
    /// Le nombre d'entrées supprimées
    pub fn purge_expired(&self, ttl: Duration) -> Result<usize> {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let threshold = Utc::now().timestamp_millis().saturating_sub(ttl_millis);

        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {TABLE_NAME} WHERE stored_at <= ?1"),
            params![threshold],
        )?;

        if deleted > 0 {
            tracing::info!(deleted, "Purged expired API cache entries");
        }
        Ok(deleted)
    }

    /// Liste les clés, des plus récentes aux plus anciennes
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT key FROM {TABLE_NAME} ORDER BY stored_at DESC"
        ))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }
}

impl ApiCache for SqliteApiCache {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn get_entry(&self, key: &str) -> Result<Option<CachedResponse>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, i64)> = conn
            .query_row(
                &format!("SELECT data, stored_at FROM {TABLE_NAME} WHERE key = ?1"),
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((data, millis)) => {
                let stored_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                    Error::InvalidTimestamp {
                        key: key.to_string(),
                        millis,
                    }
                })?;
                Ok(Some(CachedResponse::with_timestamp(key, data, stored_at)))
            }
            None => Ok(None),
        }
    }

    fn put_entry(&self, entry: CachedResponse) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {TABLE_NAME} (key, data, stored_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     data = excluded.data,
                     stored_at = excluded.stored_at"
            ),
            params![entry.key, entry.data, entry.stored_at.timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(&format!("DELETE FROM {TABLE_NAME} WHERE key = ?1"), [key])?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(&format!("DELETE FROM {TABLE_NAME}"), [])?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }
}
