use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fallback display name when neither the ledger nor the metadata names the medicine.
pub const UNKNOWN_MEDICINE: &str = "Unknown Medicine";

/// The single active wallet identity. `address` is always canonical (base58).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub session_token: String,
    pub address: String,
}

impl WalletSession {
    /// A session with either field blank is treated as absent.
    pub fn is_complete(&self) -> bool {
        !self.session_token.trim().is_empty() && !self.address.trim().is_empty()
    }
}

/// Medicine details reported by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub asset_address: String,
    /// Raw status code; see `verification::status` for the taxonomy.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    /// Everything else the ledger sent (dosage, form, lot number, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrugInfo {
    /// Placeholder used when the remote call produced no usable drug info.
    pub fn placeholder(asset_address: &str, status: impl Into<String>) -> Self {
        Self {
            name: UNKNOWN_MEDICINE.to_string(),
            symbol: None,
            asset_address: asset_address.to_string(),
            status: status.into(),
            expiry_date: None,
            manufacturer: None,
            serial_number: None,
            batch_number: None,
            extra: Map::new(),
        }
    }
}

/// Wallets involved in the ownership transfer, when the ledger reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartyWallets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_owner: Option<String>,
}

/// Diagnostic error code; the ledger sends either text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Text(code) => write!(f, "{}", code),
            ErrorCode::Number(code) => write!(f, "{}", code),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

impl PartialEq<&str> for ErrorCode {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, ErrorCode::Text(code) if code == other)
    }
}

/// Outcome of one verification; always well-formed, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
    pub drug_info: DrugInfo,
    #[serde(default)]
    pub counterparty_wallets: CounterpartyWallets,
    pub requesting_wallet: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub timestamp_iso: String,
    pub scan_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_alert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_signature: Option<String>,
    /// Unmodified response body, kept for debugging only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl VerificationResult {
    pub fn status(&self) -> &str {
        &self.drug_info.status
    }

    /// First `metadata.attributes` entry whose `trait_type` equals `trait_type`.
    pub fn attribute_value(&self, trait_type: &str) -> Option<String> {
        attribute_value(&self.metadata, trait_type)
    }

    /// Name for display: ledger name, then the "Drug Name" attribute.
    pub fn display_name(&self) -> String {
        let name = self.drug_info.name.trim();
        if !name.is_empty() && name != UNKNOWN_MEDICINE {
            return name.to_string();
        }
        self.attribute_value("Drug Name")
            .unwrap_or_else(|| UNKNOWN_MEDICINE.to_string())
    }

    /// Manufacturer from the direct field, falling back to the attribute list.
    pub fn manufacturer(&self) -> Option<String> {
        self.drug_info
            .manufacturer
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| self.attribute_value("Manufacturer"))
    }
}

/// Looks up `trait_type` in a metadata map's `attributes` array.
pub fn attribute_value(metadata: &Map<String, Value>, trait_type: &str) -> Option<String> {
    metadata
        .get("attributes")?
        .as_array()?
        .iter()
        .find(|attr| attr.get("trait_type").and_then(Value::as_str) == Some(trait_type))
        .and_then(|attr| match attr.get("value")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

/// One persisted history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    /// RFC 3339 UTC time the record was created.
    pub timestamp: String,
    /// Local, human-readable creation time.
    #[serde(rename = "scannedAt")]
    pub scanned_at_local: String,
    #[serde(flatten)]
    pub result: VerificationResult,
}

impl ScanRecord {
    pub fn status(&self) -> &str {
        self.result.status()
    }
}

impl std::ops::Deref for ScanRecord {
    type Target = VerificationResult;

    fn deref(&self) -> &Self::Target {
        &self.result
    }
}
