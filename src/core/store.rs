//! Bounded local report store backed by SQLite.
//!
//! Reports are kept as JSON bodies keyed by id, with `timestamp` and `synced`
//! columns indexed for the recency and sync access paths. The store never
//! holds more than [`MAX_REPORTS`] entries: every `save` evicts the oldest
//! reports beyond that in the same transaction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Domain, Language, Report, Severity};

/// Hard capacity of the local store
pub const MAX_REPORTS: usize = 10;

const SCHEMA_VERSION: i32 = 1;

/// Errors that can occur with the report store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store task failed: {0}")]
    Task(String),

    #[error("Store connection lock poisoned")]
    Poisoned,

    #[error("Database version {found} is newer than supported schema {supported}")]
    UnsupportedSchema { found: i32, supported: i32 },
}

/// Local aggregate counts over stored reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    pub total: usize,
    pub synced: usize,
    pub pending: usize,
    pub by_domain: BTreeMap<Domain, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_language: BTreeMap<Language, usize>,
}

/// Single-writer persistent report store
pub struct ReportStore {
    conn: Arc<Mutex<Connection>>,

    /// Database file, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl ReportStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        if let Err(e) = conn.pragma_update(None, "journal_mode", "WAL") {
            warn!("Failed to enable WAL mode: {}", e);
        }

        let store = Self::from_connection(conn, Some(path.to_path_buf()))?;
        info!("Report store opened at {}", path.display());
        Ok(store)
    }

    /// Open a throwaway store that lives only as long as this handle
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    /// Open the store in the configured home directory (`{home}/reports.db`)
    pub fn open_default() -> anyhow::Result<Self> {
        let path = crate::config::store_path()?;
        Self::open(&path)
            .with_context(|| format!("Failed to open report store: {}", path.display()))
    }

    fn from_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Database file backing this store
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and close the underlying connection
    pub fn close(self) -> Result<(), StoreError> {
        let mutex = Arc::try_unwrap(self.conn)
            .map_err(|_| StoreError::Task("store still in use".to_string()))?;
        let conn = mutex.into_inner().map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        debug!("Report store closed");
        Ok(())
    }

    /// Run `task` against the connection on the blocking pool
    async fn execute<F, T>(&self, task: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            task(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Upsert `report` by id, then evict the oldest reports beyond capacity.
    ///
    /// A report already flagged synced stays synced even when `report` is a
    /// copy taken before the flag flipped. Returns the ids of evicted reports.
    pub async fn save(&self, report: &Report) -> Result<Vec<String>, StoreError> {
        let mut report = report.clone();
        let evicted = self
            .execute(move |conn| {
                let tx = conn.transaction()?;
                let stored_synced: Option<bool> = tx
                    .query_row(
                        "SELECT synced FROM reports WHERE id = ?1",
                        params![report.id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if stored_synced == Some(true) {
                    report.synced = true;
                }

                upsert(&tx, &report)?;
                let evicted = evict_beyond_capacity(&tx)?;
                tx.commit()?;
                Ok(evicted)
            })
            .await?;

        if !evicted.is_empty() {
            info!(count = evicted.len(), "Evicted oldest reports over capacity");
        }
        Ok(evicted)
    }

    /// All reports, newest first
    pub async fn list(&self) -> Result<Vec<Report>, StoreError> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT body FROM reports ORDER BY timestamp DESC, id DESC")?;
            let bodies = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            decode_all(bodies)
        })
        .await
    }

    /// Look up a report by id
    pub async fn get(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let id = id.to_string();
        self.execute(move |conn| {
            let body: Option<String> = conn
                .query_row("SELECT body FROM reports WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;
            body.map(|b| serde_json::from_str(&b).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    /// Delete a report by id; returns whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.execute(move |conn| {
            let removed = conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }

    /// Reports not yet accepted by the collector, oldest first
    pub async fn list_unsynced(&self) -> Result<Vec<Report>, StoreError> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT body FROM reports WHERE synced = 0 ORDER BY timestamp ASC, id ASC")?;
            let bodies = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            decode_all(bodies)
        })
        .await
    }

    /// Flag a report as synced.
    ///
    /// Absent ids are a no-op. Returns whether anything changed, so a second
    /// call for the same id returns `false`.
    pub async fn mark_synced(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let body: Option<String> = tx
                .query_row("SELECT body FROM reports WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;

            let Some(body) = body else {
                return Ok(false);
            };

            let mut report: Report = serde_json::from_str(&body)?;
            if report.synced {
                return Ok(false);
            }

            report.synced = true;
            upsert(&tx, &report)?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    /// Remove every report; returns how many were removed
    pub async fn clear(&self) -> Result<usize, StoreError> {
        self.execute(|conn| Ok(conn.execute("DELETE FROM reports", [])?))
            .await
    }

    /// Number of stored reports
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Aggregate counts by domain, severity, language and sync state
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let reports = self.list().await?;

        let mut stats = StoreStats {
            total: reports.len(),
            ..Default::default()
        };
        for report in &reports {
            if report.synced {
                stats.synced += 1;
            } else {
                stats.pending += 1;
            }
            *stats.by_domain.entry(report.domain).or_default() += 1;
            *stats.by_severity.entry(report.severity).or_default() += 1;
            *stats.by_language.entry(report.language).or_default() += 1;
        }

        Ok(stats)
    }
}

fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS reports (
             id        TEXT PRIMARY KEY,
             timestamp INTEGER NOT NULL,
             synced    INTEGER NOT NULL DEFAULT 0,
             body      TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_reports_timestamp ON reports(timestamp);
         CREATE INDEX IF NOT EXISTS idx_reports_synced ON reports(synced);",
    )?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

fn upsert(tx: &Transaction<'_>, report: &Report) -> Result<(), StoreError> {
    let body = serde_json::to_string(report)?;
    tx.execute(
        "INSERT INTO reports (id, timestamp, synced, body)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             timestamp = excluded.timestamp,
             synced = excluded.synced,
             body = excluded.body",
        params![
            report.id,
            report.timestamp.timestamp_millis(),
            report.synced,
            body
        ],
    )?;
    Ok(())
}

/// Delete everything past the newest [`MAX_REPORTS`] entries
fn evict_beyond_capacity(tx: &Transaction<'_>) -> Result<Vec<String>, StoreError> {
    let evicted = {
        let mut stmt = tx.prepare(
            "SELECT id FROM reports ORDER BY timestamp DESC, id DESC LIMIT -1 OFFSET ?1",
        )?;
        let ids = stmt
            .query_map(params![MAX_REPORTS as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids
    };

    for id in &evicted {
        tx.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
    }
    Ok(evicted)
}

fn decode_all(bodies: Vec<String>) -> Result<Vec<Report>, StoreError> {
    bodies
        .iter()
        .map(|body| serde_json::from_str(body).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoLocation;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report_at(id: &str, millis: i64) -> Report {
        Report {
            id: id.to_string(),
            timestamp: Utc.timestamp_millis_opt(millis).unwrap(),
            audio_duration: 0.0,
            language: Language::En,
            transcription: "pump broken".to_string(),
            domain: Domain::IrrigationProblem,
            severity: Severity::Low,
            issue: "pump broken".to_string(),
            location: String::new(),
            geo_location: None,
            entities: vec!["pump".to_string()],
            summary_local: "Field Report: pump broken".to_string(),
            summary_en: "Field Report: pump broken".to_string(),
            synced: false,
            field_worker_note: None,
        }
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = ReportStore::open_in_memory().unwrap();
        let mut report = report_at("a", 1_000);
        store.save(&report).await.unwrap();

        report.summary_en = "edited".to_string();
        store.save(&report).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("a").await.unwrap().unwrap().summary_en, "edited");
    }

    #[tokio::test]
    async fn test_eviction_removes_oldest() {
        let store = ReportStore::open_in_memory().unwrap();
        // Saved out of order: eviction follows timestamps, not insertion
        for (i, millis) in [5, 3, 9, 1, 7, 2, 8, 4, 6, 10].into_iter().enumerate() {
            let evicted = store.save(&report_at(&format!("r{}", i), millis)).await.unwrap();
            assert!(evicted.is_empty());
        }

        let evicted = store.save(&report_at("newest", 11)).await.unwrap();
        // r3 carries the smallest timestamp
        assert_eq!(evicted, vec!["r3".to_string()]);
        assert_eq!(store.count().await.unwrap(), MAX_REPORTS);
        assert!(store.get("r3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_saving_an_old_report_over_capacity_evicts_it() {
        let store = ReportStore::open_in_memory().unwrap();
        for i in 0..MAX_REPORTS {
            store.save(&report_at(&format!("r{}", i), 100 + i as i64)).await.unwrap();
        }

        let evicted = store.save(&report_at("ancient", 1)).await.unwrap();
        assert_eq!(evicted, vec!["ancient".to_string()]);
    }

    #[tokio::test]
    async fn test_mark_synced_is_idempotent() {
        let store = ReportStore::open_in_memory().unwrap();
        store.save(&report_at("a", 1)).await.unwrap();

        assert!(store.mark_synced("a").await.unwrap());
        assert!(!store.mark_synced("a").await.unwrap());
        assert!(!store.mark_synced("missing").await.unwrap());

        assert!(store.get("a").await.unwrap().unwrap().synced);
        assert!(store.list_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let store = ReportStore::open_in_memory().unwrap();
        store.save(&report_at("a", 1)).await.unwrap();
        let mut critical = report_at("b", 2);
        critical.severity = Severity::Critical;
        critical.language = Language::Ta;
        store.save(&critical).await.unwrap();
        store.mark_synced("a").await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.synced, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.by_domain[&Domain::IrrigationProblem], 2);
        assert_eq!(stats.by_severity[&Severity::Critical], 1);
        assert_eq!(stats.by_language[&Language::Ta], 1);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("reports.db");

        let store = ReportStore::open(&path).unwrap();
        let mut report = report_at("a", 1);
        report.geo_location = Some(GeoLocation::new(11.0, 78.0, 4.0));
        store.save(&report).await.unwrap();
        store.close().unwrap();

        let store = ReportStore::open(&path).unwrap();
        let loaded = store.get("a").await.unwrap().unwrap();
        assert_eq!(loaded.id, "a");
        assert_eq!(loaded.geo_location.unwrap().latitude, 11.0);
    }
}
