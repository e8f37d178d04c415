//! Key-value persistence primitive used as the durability layer.

use async_trait::async_trait;

use crate::core::errors::StorageError;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized active wallet session.
pub const WALLET_SESSION_KEY: &str = "walletSession";
/// Key holding the serialized scan history array.
pub const SCAN_HISTORY_KEY: &str = "scanHistory";

/// Async string-keyed store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove keys; absent keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
