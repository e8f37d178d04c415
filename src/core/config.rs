use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote verification endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationConfig {
    /// Full URL of the verify endpoint
    #[serde(default = "VerificationConfig::default_endpoint")]
    pub endpoint: String,

    /// Bounded wait for one verification round-trip (seconds)
    #[serde(default = "VerificationConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl VerificationConfig {
    fn default_endpoint() -> String { "http://127.0.0.1:3000/api/verify".to_string() }
    fn default_timeout_secs() -> u64 { 15 }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Wallet authorization parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletConfig {
    /// Ledger cluster the session is authorized for
    #[serde(default = "WalletConfig::default_cluster")]
    pub cluster: String,

    /// App identity presented to the wallet
    #[serde(default = "WalletConfig::default_app_identity")]
    pub app_identity: String,
}

impl WalletConfig {
    fn default_cluster() -> String { "devnet".to_string() }
    fn default_app_identity() -> String { "Sanus Medicine Verification".to_string() }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            cluster: Self::default_cluster(),
            app_identity: Self::default_app_identity(),
        }
    }
}

/// Scan history policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Maximum number of retained records
    #[serde(default = "HistoryConfig::default_retention")]
    pub retention: usize,

    /// Number of records in the "recent scans" view
    #[serde(default = "HistoryConfig::default_recent_limit")]
    pub recent_limit: usize,
}

impl HistoryConfig {
    fn default_retention() -> usize { crate::history::DEFAULT_RETENTION }
    fn default_recent_limit() -> usize { 15 }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention: Self::default_retention(),
            recent_limit: Self::default_recent_limit(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf { PathBuf::from("./sanus-data") }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: Self::default_data_dir() }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Parse a TOML document; absent sections fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults, then apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `CONFIG_PATH` (default `sanus.toml`).
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "sanus.toml".to_string());
        Self::load(Path::new(&path))
    }

    /// Overlay `SANUS_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("SANUS_VERIFY_ENDPOINT") {
            self.verification.endpoint = endpoint;
        }
        if let Ok(timeout) = std::env::var("SANUS_VERIFY_TIMEOUT_SECS") {
            self.verification.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("SANUS_VERIFY_TIMEOUT_SECS is not a number: {}", timeout))?;
        }
        if let Ok(cluster) = std::env::var("SANUS_CLUSTER") {
            self.wallet.cluster = cluster;
        }
        if let Ok(dir) = std::env::var("SANUS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.verification.endpoint.trim().is_empty() {
            bail!("verification.endpoint must not be empty");
        }
        if self.verification.timeout_secs == 0 {
            bail!("verification.timeout_secs must be greater than zero");
        }
        if self.history.retention == 0 {
            bail!("history.retention must be greater than zero");
        }
        if self.wallet.cluster.trim().is_empty() {
            bail!("wallet.cluster must not be empty");
        }
        Ok(())
    }
}
