//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use sanus_verify::core::domain::{CounterpartyWallets, DrugInfo, VerificationResult};
use sanus_verify::core::errors::StorageError;
use sanus_verify::storage::{KeyValueStore, MemoryStore};
use sanus_verify::wallet::{Authorization, AuthorizationRequest, ProviderFailure, WalletAccount, WalletAuthorizer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Base64 form of a 32-byte account key, as the wallet hands it over.
pub const RAW_ACCOUNT: &str = "XNnv7SCFMce3faxK+jUqGCOqit1Q902ZA9GVD6wLHBc=";

/// Authorizer that counts prompts and optionally stalls before answering.
pub struct CountingAuthorizer {
    outcome: Result<Authorization, ProviderFailure>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingAuthorizer {
    pub fn approving() -> Self {
        Self::with_outcome(Ok(Authorization {
            session_token: "session-token".to_string(),
            accounts: vec![WalletAccount { address: RAW_ACCOUNT.to_string() }],
        }))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_outcome(Err(ProviderFailure::new(reason)))
    }

    pub fn with_outcome(outcome: Result<Authorization, ProviderFailure>) -> Self {
        Self { outcome, delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletAuthorizer for CountingAuthorizer {
    async fn authorize(&self, _request: &AuthorizationRequest) -> Result<Authorization, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// Store whose writes always fail; reads and removes go to memory.
#[derive(Default)]
pub struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write { key: key.to_string(), reason: "read-only volume".to_string() })
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.inner.remove(keys).await
    }
}

pub fn verification_result(name: &str, status: &str) -> VerificationResult {
    let mut drug_info = DrugInfo::placeholder("ASSET", status);
    drug_info.name = name.to_string();
    VerificationResult {
        success: status == "AUTHENTIC",
        message: String::new(),
        drug_info,
        counterparty_wallets: CounterpartyWallets::default(),
        requesting_wallet: "wallet".to_string(),
        metadata: Default::default(),
        error_code: None,
        timestamp_iso: chrono::Utc::now().to_rfc3339(),
        scan_type: "qr".to_string(),
        security_alert: None,
        transaction_signature: None,
        raw_response: None,
    }
}
