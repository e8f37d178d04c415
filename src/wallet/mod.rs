//! Wallet identity: address encoding, the authorization capability and the
//! single active session.

pub mod address;
pub mod provider;
pub mod session_manager;

pub use address::{encode_address, shorten_address};
pub use provider::{
    Authorization, AuthorizationRequest, EnvWalletAuthorizer, ProviderFailure, WalletAccount,
    WalletAuthorizer,
};
pub use session_manager::SessionManager;
