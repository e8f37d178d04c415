//! Remote verification: request/response handling and the verdict taxonomy.

pub mod client;
pub mod response;
pub mod status;

pub use client::VerificationClient;
pub use response::{ParsedResponse, ScanContext};
pub use status::{classify, describe, ColorRole, Severity, StatusDescriptor, Verdict};
