//! Scan-to-verdict pipeline
//!
//! Ties the pieces together for one scan: make sure a wallet session exists,
//! verify the payload with the remote service, classify the verdict and record
//! it in history. Only a missing wallet identity aborts a scan; every
//! verification outcome, failures included, ends up as a history record.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::config::AppConfig;
use crate::core::domain::ScanRecord;
use crate::core::errors::{PipelineError, StorageError};
use crate::history::{category_counts, CategoryCounts, HistoryFilter, ScanHistoryStore};
use crate::storage::KeyValueStore;
use crate::verification::{classify, Severity, StatusDescriptor, VerificationClient};
use crate::wallet::{shorten_address, SessionManager, WalletAuthorizer};

/// Scan type recorded when the caller does not supply one.
pub const DEFAULT_SCAN_TYPE: &str = "qr";

pub struct ScanPipeline {
    sessions: Arc<SessionManager>,
    verifier: VerificationClient,
    history: Arc<ScanHistoryStore>,
    cluster: String,
    app_identity: String,
    recent_limit: usize,
}

impl ScanPipeline {
    /// Build a pipeline over `store` from configuration.
    pub fn new(config: &AppConfig, store: Arc<dyn KeyValueStore>, authorizer: Arc<dyn WalletAuthorizer>) -> Self {
        let sessions = Arc::new(SessionManager::new(store.clone(), authorizer));
        let history = Arc::new(ScanHistoryStore::with_retention(store, config.history.retention));
        Self::from_parts(config, sessions, VerificationClient::new(&config.verification), history)
    }

    pub fn from_parts(
        config: &AppConfig,
        sessions: Arc<SessionManager>,
        verifier: VerificationClient,
        history: Arc<ScanHistoryStore>,
    ) -> Self {
        Self {
            sessions,
            verifier,
            history,
            cluster: config.wallet.cluster.clone(),
            app_identity: config.wallet.app_identity.clone(),
            recent_limit: config.history.recent_limit,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn history(&self) -> &Arc<ScanHistoryStore> {
        &self.history
    }

    /// Verify one scanned payload and record the outcome.
    ///
    /// Returns `Err` only when no wallet session could be obtained; in that
    /// case nothing is sent and nothing is recorded.
    pub async fn run_scan(&self, payload: &str, scan_type: Option<&str>) -> Result<ScanRecord, PipelineError> {
        let scan_type = scan_type.filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_SCAN_TYPE);

        let session = match self.sessions.ensure_session(&self.cluster, &self.app_identity).await {
            Ok(session) => session,
            Err(e) => {
                warn!(code = e.error_code(), error = %e, "scan aborted, no wallet session");
                return Err(e.into());
            }
        };

        let result = self.verifier.verify(&session.address, payload, scan_type).await;
        let descriptor = classify(result.status());
        log_verdict(&descriptor, &session.address);

        Ok(self.history.append(result).await)
    }

    /// Filtered history, newest first.
    pub async fn get_history(&self, filter: &HistoryFilter) -> Vec<ScanRecord> {
        filter.apply(&self.history.list().await)
    }

    /// The configured number of most recent scans.
    pub async fn recent_scans(&self) -> Vec<ScanRecord> {
        self.history.recent(self.recent_limit).await
    }

    pub async fn history_counts(&self) -> CategoryCounts {
        category_counts(&self.history.list().await)
    }

    /// Canonical address of the active session, if any. Never prompts.
    pub async fn get_active_wallet_address(&self) -> Option<String> {
        self.sessions.get_active_session().await.map(|session| session.address)
    }

    pub async fn disconnect_wallet(&self) {
        self.sessions.invalidate_session().await;
    }

    pub async fn clear_history(&self) -> Result<(), StorageError> {
        self.history.clear().await
    }

    pub fn classify(&self, status: &str) -> StatusDescriptor {
        classify(status)
    }
}

fn log_verdict(descriptor: &StatusDescriptor, address: &str) {
    let wallet = shorten_address(address);
    match descriptor.severity {
        Severity::Critical => {
            error!(verdict = %descriptor.verdict, wallet = %wallet, "{}", descriptor.label)
        }
        Severity::Failure | Severity::Warning => {
            warn!(verdict = %descriptor.verdict, wallet = %wallet, "{}", descriptor.label)
        }
        _ => info!(verdict = %descriptor.verdict, wallet = %wallet, "{}", descriptor.label),
    }
}
