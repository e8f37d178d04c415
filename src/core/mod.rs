pub mod config;
pub mod domain;
pub mod errors;

pub use config::AppConfig;
pub use domain::{
    CounterpartyWallets, DrugInfo, ErrorCode, ScanRecord, VerificationResult, WalletSession,
};
pub use errors::{
    AddressFormatError, PipelineError, SessionError, StorageError, VerificationFailure,
};
