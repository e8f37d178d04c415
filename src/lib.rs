#![allow(clippy::needless_return)]
#![allow(clippy::len_zero)]
#![allow(clippy::doc_lazy_continuation)]
// src/lib.rs

pub mod cli;
pub mod core;
pub mod history;
pub mod pipeline;
pub mod storage;
pub mod verification;
pub mod wallet;

pub use crate::core::{AppConfig, PipelineError, ScanRecord, VerificationResult, WalletSession};
pub use crate::pipeline::ScanPipeline;
