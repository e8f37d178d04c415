//! tests/session_tests.rs
//!
//! Wallet session acquisition: reuse, single-flight, failure mapping and
//! storage failures.

mod common;

use common::{CountingAuthorizer, ReadOnlyStore, RAW_ACCOUNT};
use sanus_verify::core::domain::WalletSession;
use sanus_verify::core::errors::{AddressFormatError, SessionError};
use sanus_verify::storage::{KeyValueStore, MemoryStore, WALLET_SESSION_KEY};
use sanus_verify::wallet::{encode_address, Authorization, SessionManager, WalletAccount};
use std::sync::Arc;
use std::time::Duration;

const CLUSTER: &str = "devnet";
const IDENTITY: &str = "Sanus Medicine Verification";

fn manager(store: &MemoryStore, authorizer: &Arc<CountingAuthorizer>) -> SessionManager {
    SessionManager::new(Arc::new(store.clone()), authorizer.clone())
}

#[tokio::test]
async fn test_existing_session_is_reused_without_prompt() {
    let store = MemoryStore::new();
    let session = WalletSession { session_token: "tok".to_string(), address: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string() };
    store.set(WALLET_SESSION_KEY, &serde_json::to_string(&session).unwrap()).await.unwrap();

    let authorizer = Arc::new(CountingAuthorizer::approving());
    let manager = manager(&store, &authorizer);

    for _ in 0..3 {
        assert_eq!(manager.ensure_session(CLUSTER, IDENTITY).await.unwrap(), session);
    }
    assert_eq!(authorizer.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_prompt() {
    let store = MemoryStore::new();
    let authorizer = Arc::new(CountingAuthorizer::approving().delayed(Duration::from_millis(100)));
    let manager = Arc::new(manager(&store, &authorizer));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.ensure_session(CLUSTER, IDENTITY).await })
        })
        .collect();

    let mut sessions = Vec::new();
    for handle in handles {
        sessions.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(authorizer.calls(), 1);
    assert!(sessions.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(sessions[0].address, encode_address(RAW_ACCOUNT).unwrap());
}

#[tokio::test]
async fn test_concurrent_callers_share_failure_then_retry_prompts_again() {
    let store = MemoryStore::new();
    let authorizer = Arc::new(CountingAuthorizer::failing("ERROR_NO_WALLET_FOUND").delayed(Duration::from_millis(50)));
    let manager = Arc::new(manager(&store, &authorizer));

    let (a, b) = tokio::join!(manager.ensure_session(CLUSTER, IDENTITY), manager.ensure_session(CLUSTER, IDENTITY));
    assert_eq!(a, Err(SessionError::NoCompatibleWallet));
    assert_eq!(b, Err(SessionError::NoCompatibleWallet));
    assert_eq!(authorizer.calls(), 1);

    let _ = manager.ensure_session(CLUSTER, IDENTITY).await;
    assert_eq!(authorizer.calls(), 2);
}

#[tokio::test]
async fn test_undecodable_address_leaves_no_session() {
    let store = MemoryStore::new();
    let authorizer = Arc::new(CountingAuthorizer::with_outcome(Ok(Authorization {
        session_token: "tok".to_string(),
        accounts: vec![WalletAccount { address: "not*base64".to_string() }],
    })));
    let manager = manager(&store, &authorizer);

    let err = manager.ensure_session(CLUSTER, IDENTITY).await.unwrap_err();
    assert!(matches!(err, SessionError::AddressFormat(AddressFormatError::InvalidEncoding(_))));
    assert_eq!(store.get(WALLET_SESSION_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_storage_write_failure_is_reported() {
    let store = Arc::new(ReadOnlyStore::default());
    let authorizer = Arc::new(CountingAuthorizer::approving());
    let manager = SessionManager::new(store.clone(), authorizer);

    let err = manager.ensure_session(CLUSTER, IDENTITY).await.unwrap_err();
    assert!(matches!(err, SessionError::StorageWriteFailed(_)));
    assert_eq!(err.error_code(), "storage_write_failed");
    assert_eq!(manager.get_active_session().await, None);
}

#[tokio::test]
async fn test_generic_provider_failure() {
    let store = MemoryStore::new();
    let authorizer = Arc::new(CountingAuthorizer::failing("transport closed"));
    let manager = manager(&store, &authorizer);

    assert_eq!(
        manager.ensure_session(CLUSTER, IDENTITY).await,
        Err(SessionError::AuthorizationFailed("transport closed".to_string()))
    );
}
