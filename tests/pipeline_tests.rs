//! tests/pipeline_tests.rs
//!
//! End-to-end scans against a mocked verify endpoint:
//! - authentic verdict recorded in history
//! - timeout folded into a NETWORK_ERROR record
//! - wallet cancellation aborts before any request

mod common;

use common::{CountingAuthorizer, RAW_ACCOUNT};
use httpmock::{Method, MockServer};
use pretty_assertions::assert_eq;
use sanus_verify::core::config::AppConfig;
use sanus_verify::core::errors::{PipelineError, SessionError};
use sanus_verify::history::{Category, HistoryFilter, ScanHistoryStore};
use sanus_verify::pipeline::ScanPipeline;
use sanus_verify::storage::{KeyValueStore, MemoryStore, WALLET_SESSION_KEY};
use sanus_verify::verification::{Severity, VerificationClient};
use sanus_verify::wallet::{encode_address, SessionManager};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn pipeline(endpoint: &str, timeout: Duration, authorizer: Arc<CountingAuthorizer>) -> (MemoryStore, ScanPipeline) {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let config = AppConfig::default();
    let pipeline = ScanPipeline::from_parts(
        &config,
        Arc::new(SessionManager::new(shared.clone(), authorizer)),
        VerificationClient::with_timeout(endpoint, timeout),
        Arc::new(ScanHistoryStore::new(shared)),
    );
    (store, pipeline)
}

#[tokio::test]
async fn test_authentic_scan_is_recorded() {
    let server = MockServer::start_async().await;
    let address = encode_address(RAW_ACCOUNT).unwrap();

    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/verify")
                .json_body(json!({"recipientWallet": address, "encryptedAsset": "ASSET123"}));
            then.status(200).json_body(json!({
                "success": true,
                "message": "Medicine verified",
                "data": {
                    "drugInfo": {"name": "Amoxicillin", "status": "AUTHENTIC", "assetAddress": "ASSET123"}
                }
            }));
        })
        .await;

    let authorizer = Arc::new(CountingAuthorizer::approving());
    let (_store, pipeline) = pipeline(&server.url("/api/verify"), Duration::from_secs(5), authorizer.clone());

    let record = pipeline.run_scan("ASSET123", None).await.unwrap();
    mock.assert_async().await;

    assert_eq!(record.status(), "AUTHENTIC");
    assert!(record.success);
    assert_eq!(record.requesting_wallet, address);
    assert_eq!(record.scan_type, "qr");
    assert_eq!(pipeline.classify(record.status()).severity, Severity::Success);

    let history = pipeline.get_history(&HistoryFilter::new()).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].drug_info.name, "Amoxicillin");
    assert_eq!(history[0].id, record.id);
    assert_eq!(authorizer.calls(), 1);
}

#[tokio::test]
async fn test_timeout_becomes_network_error_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/verify");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"success": true, "data": {"drugInfo": {"status": "AUTHENTIC"}}}));
        })
        .await;

    let authorizer = Arc::new(CountingAuthorizer::approving());
    let (_store, pipeline) = pipeline(&server.url("/api/verify"), Duration::from_millis(200), authorizer);

    let record = pipeline.run_scan("ASSET123", Some("qr")).await.unwrap();
    assert!(!record.success);
    assert_eq!(record.status(), "NETWORK_ERROR");
    assert_eq!(record.error_code.as_ref().map(|c| c.to_string()).as_deref(), Some("NETWORK_ERROR"));
    assert_eq!(record.drug_info.asset_address, "ASSET123");

    let descriptor = pipeline.classify(record.status());
    assert!(descriptor.verdict.is_local_failure());
    assert_eq!(pipeline.recent_scans().await.len(), 1);
}

#[tokio::test]
async fn test_cancelled_authorization_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/verify");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    let authorizer = Arc::new(CountingAuthorizer::failing("USER_REJECTED"));
    let (store, pipeline) = pipeline(&server.url("/api/verify"), Duration::from_secs(5), authorizer);

    let err = pipeline.run_scan("ASSET123", None).await.unwrap_err();
    assert_eq!(err, PipelineError::Session(SessionError::UserCancelled));
    assert_eq!(mock.hits_async().await, 0);
    assert!(pipeline.get_history(&HistoryFilter::new()).await.is_empty());
    assert_eq!(store.get(WALLET_SESSION_KEY).await.unwrap(), None);
    assert_eq!(pipeline.get_active_wallet_address().await, None);
}

#[tokio::test]
async fn test_rejection_verdicts_and_session_reuse() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/verify")
                .json_body_partial(r#"{"encryptedAsset": "FAKE1"}"#);
            then.status(409).json_body(json!({
                "success": false,
                "message": "Ownership mismatch",
                "errorCode": "COUNTERFEIT_SUSPECTED",
                "data": {"currentOwner": "OwnerA", "expectedOwner": "OwnerB", "securityAlert": "Report this pack"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/api/verify")
                .json_body_partial(r#"{"encryptedAsset": "OLD1"}"#);
            then.status(200).json_body(json!({
                "success": false,
                "data": {"drugInfo": {"name": "Insulin", "status": "EXPIRED", "expiryDate": "2023-01-01"}}
            }));
        })
        .await;

    let authorizer = Arc::new(CountingAuthorizer::approving());
    let (_store, pipeline) = pipeline(&server.url("/api/verify"), Duration::from_secs(5), authorizer.clone());

    let counterfeit = pipeline.run_scan("FAKE1", None).await.unwrap();
    assert_eq!(counterfeit.status(), "COUNTERFEIT_SUSPECTED");
    assert_eq!(counterfeit.counterparty_wallets.current_owner.as_deref(), Some("OwnerA"));
    assert_eq!(counterfeit.security_alert.as_deref(), Some("Report this pack"));
    assert_eq!(pipeline.classify(counterfeit.status()).severity, Severity::Critical);

    let expired = pipeline.run_scan("OLD1", None).await.unwrap();
    assert_eq!(expired.status(), "EXPIRED");

    // Second scan reused the persisted session.
    assert_eq!(authorizer.calls(), 1);

    let counts = pipeline.history_counts().await;
    assert_eq!(counts.total, 2);
    assert_eq!(counts.counterfeit, 1);
    assert_eq!(counts.expired, 1);

    let only_expired = pipeline.get_history(&HistoryFilter::new().with_category(Category::Expired)).await;
    assert_eq!(only_expired.len(), 1);
    assert_eq!(only_expired[0].drug_info.name, "Insulin");
}

#[tokio::test]
async fn test_disconnect_forces_new_authorization() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/api/verify");
            then.status(200).json_body(json!({"success": true, "data": {"drugInfo": {"status": "AUTHENTIC"}}}));
        })
        .await;

    let authorizer = Arc::new(CountingAuthorizer::approving());
    let (_store, pipeline) = pipeline(&server.url("/api/verify"), Duration::from_secs(5), authorizer.clone());

    pipeline.run_scan("ASSET1", None).await.unwrap();
    assert!(pipeline.get_active_wallet_address().await.is_some());

    pipeline.disconnect_wallet().await;
    assert_eq!(pipeline.get_active_wallet_address().await, None);

    pipeline.run_scan("ASSET2", None).await.unwrap();
    assert_eq!(authorizer.calls(), 2);

    pipeline.clear_history().await.unwrap();
    assert!(pipeline.recent_scans().await.is_empty());
}
