//! Wallet authorization capability (external collaborator).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::errors::SessionError;

/// Parameters of one authorization prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub cluster_id: String,
    pub app_identity: String,
}

/// Account exposed by the wallet, address still in the provider's base64 form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
}

/// Successful authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub session_token: String,
    pub accounts: Vec<WalletAccount>,
}

/// Provider-specific failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub reason: String,
}

impl ProviderFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for ProviderFailure {}

impl From<ProviderFailure> for SessionError {
    /// Match the known provider markers; anything else is a generic failure.
    fn from(failure: ProviderFailure) -> Self {
        let reason = failure.reason.to_lowercase();
        if reason.contains("user_rejected") || reason.contains("cancel") {
            SessionError::UserCancelled
        } else if reason.contains("no_wallet_found") || reason.contains("no wallet found") {
            SessionError::NoCompatibleWallet
        } else {
            SessionError::AuthorizationFailed(failure.reason)
        }
    }
}

/// Prompts the user's wallet for a session.
#[async_trait]
pub trait WalletAuthorizer: Send + Sync {
    async fn authorize(&self, request: &AuthorizationRequest) -> Result<Authorization, ProviderFailure>;
}

/// Authorizer for headless use: reads a pre-issued token and account from
/// `SANUS_WALLET_AUTH_TOKEN` / `SANUS_WALLET_ACCOUNT`.
#[derive(Debug, Clone, Default)]
pub struct EnvWalletAuthorizer;

impl EnvWalletAuthorizer {
    pub const TOKEN_VAR: &'static str = "SANUS_WALLET_AUTH_TOKEN";
    pub const ACCOUNT_VAR: &'static str = "SANUS_WALLET_ACCOUNT";
}

#[async_trait]
impl WalletAuthorizer for EnvWalletAuthorizer {
    async fn authorize(&self, request: &AuthorizationRequest) -> Result<Authorization, ProviderFailure> {
        let token = std::env::var(Self::TOKEN_VAR).ok().filter(|v| !v.trim().is_empty());
        let account = std::env::var(Self::ACCOUNT_VAR).ok().filter(|v| !v.trim().is_empty());
        match (token, account) {
            (Some(session_token), Some(address)) => {
                tracing::debug!(cluster = %request.cluster_id, "authorized from environment");
                Ok(Authorization {
                    session_token,
                    accounts: vec![WalletAccount { address: address.trim().to_string() }],
                })
            }
            _ => Err(ProviderFailure::new(format!(
                "NO_WALLET_FOUND: set {} and {}",
                Self::TOKEN_VAR,
                Self::ACCOUNT_VAR
            ))),
        }
    }
}
