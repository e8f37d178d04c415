//! Error types shared across the scan pipeline.

use thiserror::Error;

/// Failure of the key-value persistence primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage read failed for key {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Storage write failed for key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Storage remove failed: {0}")]
    Remove(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// The provider's raw account address could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressFormatError {
    #[error("Invalid address format: empty address")]
    Empty,

    #[error("Invalid address format: {0}")]
    InvalidEncoding(String),
}

/// Reasons `ensure_session` can fail. Cloneable so every waiter of a shared
/// authorization receives the same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Wallet authorization was cancelled by the user")]
    UserCancelled,

    #[error("No compatible wallet app found")]
    NoCompatibleWallet,

    #[error("No accounts found in wallet")]
    NoAccounts,

    #[error(transparent)]
    AddressFormat(#[from] AddressFormatError),

    #[error("Failed to store wallet session: {0}")]
    StorageWriteFailed(String),

    #[error("Wallet authorization failed: {0}")]
    AuthorizationFailed(String),
}

impl SessionError {
    /// Machine-readable code for the navigation layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserCancelled => "user_cancelled",
            Self::NoCompatibleWallet => "no_compatible_wallet",
            Self::NoAccounts => "no_accounts",
            Self::AddressFormat(_) => "address_format",
            Self::StorageWriteFailed(_) => "storage_write_failed",
            Self::AuthorizationFailed(_) => "authorization_failed",
        }
    }

    /// Actionable message shown when the scan cannot proceed.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserCancelled => "You cancelled the wallet connection.",
            Self::NoCompatibleWallet => "Please install a Solana wallet app first.",
            Self::NoAccounts => "Your wallet did not share any account. Please try again.",
            Self::AddressFormat(_) => "Invalid wallet address format received.",
            Self::StorageWriteFailed(_) => "Could not save the wallet connection. Please try again.",
            Self::AuthorizationFailed(_) => "Failed to connect wallet. Please try again.",
        }
    }

    /// Whether offering a "try again" action makes sense.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NoCompatibleWallet)
    }
}

/// Transport or protocol failure inside the verification client. Never
/// escapes `VerificationClient::verify`; it is folded into the result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("Network error: {0}")]
    Network(String),

    /// Bounded wait elapsed, in milliseconds.
    #[error("Verification request timed out after {0}ms")]
    Timeout(u64),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Remote rejected verification: {code}")]
    RemoteRejected { code: String, message: String },

    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
}

impl VerificationFailure {
    /// Diagnostic code stored in `errorCode`.
    pub fn error_code(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => "NETWORK_ERROR".to_string(),
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE".to_string(),
            Self::RemoteRejected { code, .. } => code.clone(),
            Self::HttpStatus(status) => format!("HTTP_{}", status),
        }
    }

    /// Status code substituted into `drugInfo.status`.
    pub fn status_code(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => crate::verification::status::NETWORK_ERROR.to_string(),
            Self::MalformedResponse(_) | Self::HttpStatus(_) => {
                crate::verification::status::SYSTEM_ERROR.to_string()
            }
            Self::RemoteRejected { code, .. } => code.clone(),
        }
    }

    /// Message surfaced on the verdict screen.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => {
                "Unable to reach the verification service. Check your connection and try again."
                    .to_string()
            }
            Self::MalformedResponse(_) | Self::HttpStatus(_) => {
                "The verification service returned an unexpected response.".to_string()
            }
            Self::RemoteRejected { message, .. } => message.clone(),
        }
    }
}

/// The only failure the scan pipeline propagates: no identity to verify with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Wallet session unavailable: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_storage_error() {
        let err = StorageError::Write { key: "scanHistory".to_string(), reason: "disk full".to_string() };
        assert_eq!(format!("{}", err), "Storage write failed for key scanHistory: disk full");
    }

    #[test]
    fn test_address_error_is_transparent_in_session_error() {
        let err: SessionError = AddressFormatError::InvalidEncoding("bad padding".to_string()).into();
        assert_eq!(err.to_string(), "Invalid address format: bad padding");
        assert_eq!(err.error_code(), "address_format");
    }

    #[test]
    fn test_session_error_retryable() {
        assert!(SessionError::UserCancelled.is_retryable());
        assert!(!SessionError::NoCompatibleWallet.is_retryable());
    }

    #[test]
    fn test_failure_codes() {
        assert_eq!(VerificationFailure::Timeout(15_000).error_code(), "NETWORK_ERROR");
        assert_eq!(VerificationFailure::Timeout(15_000).status_code(), "NETWORK_ERROR");
        assert_eq!(
            VerificationFailure::Timeout(200).to_string(),
            "Verification request timed out after 200ms"
        );
        assert_eq!(VerificationFailure::HttpStatus(502).error_code(), "HTTP_502");
        assert_eq!(VerificationFailure::HttpStatus(502).status_code(), "SYSTEM_ERROR");
        let rejected = VerificationFailure::RemoteRejected {
            code: "ASSET_NOT_FOUND".to_string(),
            message: "No such asset".to_string(),
        };
        assert_eq!(rejected.status_code(), "ASSET_NOT_FOUND");
        assert_eq!(rejected.user_message(), "No such asset");
    }
}
