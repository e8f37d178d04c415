//! Scan history store
//!
//! The whole history lives under one key as a JSON array, newest first,
//! capped at the retention limit. Appends are serialized through a write lock
//! so concurrent scans never lose each other's records.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::DEFAULT_RETENTION;
use crate::core::domain::{ScanRecord, VerificationResult};
use crate::core::errors::StorageError;
use crate::storage::{KeyValueStore, SCAN_HISTORY_KEY};

/// Scan history store
pub struct ScanHistoryStore {
    store: Arc<dyn KeyValueStore>,
    retention: usize,
    write_lock: Mutex<()>,
    /// Last issued id (epoch millis), keeps ids unique within the process
    last_id: AtomicI64,
}

impl ScanHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_retention(store, DEFAULT_RETENTION)
    }

    pub fn with_retention(store: Arc<dyn KeyValueStore>, retention: usize) -> Self {
        Self {
            store,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
            last_id: AtomicI64::new(0),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Record `result` as the newest entry and return the stored record.
    ///
    /// Persistence failures are logged, never returned: a scan result is
    /// still shown even if it could not be saved.
    pub async fn append(&self, result: VerificationResult) -> ScanRecord {
        let now = Utc::now();
        let record = ScanRecord {
            id: self.next_id(now.timestamp_millis()).to_string(),
            timestamp: now.to_rfc3339(),
            scanned_at_local: now.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            result,
        };

        let _guard = self.write_lock.lock().await;
        let mut history = match self.read_history().await {
            Ok(history) => history,
            Err(StorageError::Serialization(reason)) => {
                warn!(reason = %reason, "scan history is not a record list, starting a new one");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, id = %record.id, "scan history unavailable, record not persisted");
                return record;
            }
        };

        history.insert(0, record.clone());
        if history.len() > self.retention {
            let evicted = history.len() - self.retention;
            history.truncate(self.retention);
            debug!(evicted, "evicted oldest scan records");
        }

        match self.write_history(&history).await {
            Ok(()) => info!(id = %record.id, status = %record.status(), total = history.len(), "scan recorded"),
            Err(e) => warn!(error = %e, id = %record.id, "failed to persist scan record"),
        }
        record
    }

    /// All records, newest first. Absent or unreadable history is empty.
    pub async fn list(&self) -> Vec<ScanRecord> {
        match self.read_history().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "failed to read scan history");
                Vec::new()
            }
        }
    }

    /// Up to `limit` records ordered by timestamp, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<ScanRecord> {
        let mut history = self.list().await;
        history.sort_by(|a, b| compare_newest_first(&a.timestamp, &b.timestamp));
        history.truncate(limit);
        history
    }

    /// Drop the whole history.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&[SCAN_HISTORY_KEY]).await?;
        info!("scan history cleared");
        Ok(())
    }

    /// `Serialization` only when the stored value is not a JSON array;
    /// individual unreadable records are skipped.
    async fn read_history(&self) -> Result<Vec<ScanRecord>, StorageError> {
        let raw = match self.store.get(SCAN_HISTORY_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        let entries: Vec<Value> = serde_json::from_str(&raw)?;
        let total = entries.len();
        let records: Vec<ScanRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable scan record");
                    None
                }
            })
            .collect();
        if records.len() < total {
            debug!(kept = records.len(), total, "scan history partially readable");
        }
        Ok(records)
    }

    async fn write_history(&self, history: &[ScanRecord]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(history)?;
        self.store.set(SCAN_HISTORY_KEY, &serialized).await
    }

    fn next_id(&self, now_ms: i64) -> i64 {
        let previous = self
            .last_id
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or(now_ms);
        now_ms.max(previous + 1)
    }
}

/// Unparseable timestamps sort after every valid one.
fn compare_newest_first(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}
