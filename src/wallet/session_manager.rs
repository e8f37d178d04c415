//! Wallet session management
//!
//! Owns the single active `(session token, address)` pair: reading it back from
//! storage, acquiring it through the wallet provider, and dropping it again.
//! Concurrent `ensure_session` calls share one authorization prompt.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::address::{encode_address, shorten_address};
use super::provider::{AuthorizationRequest, WalletAuthorizer};
use crate::core::domain::WalletSession;
use crate::core::errors::SessionError;
use crate::storage::{KeyValueStore, WALLET_SESSION_KEY};

type AuthorizeOutcome = Result<WalletSession, SessionError>;
type InFlight = Shared<BoxFuture<'static, AuthorizeOutcome>>;

/// Session manager
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    authorizer: Arc<dyn WalletAuthorizer>,
    /// Authorization currently awaiting the wallet, if any
    in_flight: Mutex<Option<InFlight>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, authorizer: Arc<dyn WalletAuthorizer>) -> Self {
        Self { store, authorizer, in_flight: Mutex::new(None) }
    }

    /// Persisted session, or `None` if absent, incomplete or unreadable.
    /// Never prompts the wallet.
    pub async fn get_active_session(&self) -> Option<WalletSession> {
        load_session(self.store.as_ref()).await
    }

    /// Return the active session, authorizing once if there is none.
    ///
    /// A call made while another authorization is pending waits for that one
    /// and receives the same outcome.
    pub async fn ensure_session(&self, cluster_id: &str, app_identity: &str) -> AuthorizeOutcome {
        if let Some(session) = self.get_active_session().await {
            return Ok(session);
        }

        let shared = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("joining in-flight wallet authorization");
                    pending.clone()
                }
                None => {
                    let request = AuthorizationRequest {
                        cluster_id: cluster_id.to_string(),
                        app_identity: app_identity.to_string(),
                    };
                    let pending = authorize_and_persist(self.store.clone(), self.authorizer.clone(), request)
                        .boxed()
                        .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let outcome = shared.clone().await;

        let mut slot = self.in_flight.lock();
        if slot.as_ref().map_or(false, |current| current.ptr_eq(&shared)) {
            *slot = None;
        }
        outcome
    }

    /// Delete the persisted session. Idempotent; storage failures are logged.
    pub async fn invalidate_session(&self) {
        remove_session(self.store.as_ref()).await;
        info!("wallet session invalidated");
    }
}

async fn load_session(store: &dyn KeyValueStore) -> Option<WalletSession> {
    let raw = match store.get(WALLET_SESSION_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "failed to read wallet session");
            return None;
        }
    };
    match serde_json::from_str::<WalletSession>(&raw) {
        Ok(session) if session.is_complete() => Some(session),
        Ok(_) => {
            debug!("stored wallet session is incomplete");
            None
        }
        Err(e) => {
            warn!(error = %e, "stored wallet session is unreadable");
            None
        }
    }
}

async fn remove_session(store: &dyn KeyValueStore) {
    if let Err(e) = store.remove(&[WALLET_SESSION_KEY]).await {
        warn!(error = %e, "failed to remove wallet session");
    }
}

async fn authorize_and_persist(
    store: Arc<dyn KeyValueStore>,
    authorizer: Arc<dyn WalletAuthorizer>,
    request: AuthorizationRequest,
) -> AuthorizeOutcome {
    // A previous authorization may have completed between the caller's read and now.
    if let Some(session) = load_session(store.as_ref()).await {
        return Ok(session);
    }

    info!(cluster = %request.cluster_id, "requesting wallet authorization");
    let authorization = authorizer.authorize(&request).await.map_err(|failure| {
        let err = SessionError::from(failure);
        warn!(code = err.error_code(), error = %err, "wallet authorization failed");
        err
    })?;

    let account = authorization.accounts.first().ok_or(SessionError::NoAccounts)?;
    let address = match encode_address(&account.address) {
        Ok(address) => address,
        Err(e) => {
            warn!(error = %e, "wallet returned an undecodable address");
            remove_session(store.as_ref()).await;
            return Err(e.into());
        }
    };
    if authorization.session_token.trim().is_empty() {
        return Err(SessionError::AuthorizationFailed("wallet returned an empty session token".to_string()));
    }

    let session = WalletSession { session_token: authorization.session_token, address };
    let serialized = serde_json::to_string(&session)
        .map_err(|e| SessionError::StorageWriteFailed(e.to_string()))?;
    if let Err(e) = store.set(WALLET_SESSION_KEY, &serialized).await {
        warn!(error = %e, "failed to persist wallet session");
        remove_session(store.as_ref()).await;
        return Err(SessionError::StorageWriteFailed(e.to_string()));
    }

    info!(address = %shorten_address(&session.address), "wallet session established");
    Ok(session)
}
