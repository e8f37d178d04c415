//! Verdict taxonomy and presentation descriptors.
//!
//! Transport/system failures get their own `Failure` band so a network
//! problem is never shown like a verdict on the medicine.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const AUTHENTIC: &str = "AUTHENTIC";
pub const ALREADY_OWNED: &str = "ALREADY_OWNED";
pub const EXPIRED: &str = "EXPIRED";
pub const COUNTERFEIT_SUSPECTED: &str = "COUNTERFEIT_SUSPECTED";
pub const TAMPERED_QR: &str = "TAMPERED_QR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INVALID_QR_FORMAT: &str = "INVALID_QR_FORMAT";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const SYSTEM_ERROR: &str = "SYSTEM_ERROR";
pub const ASSET_NOT_FOUND: &str = "ASSET_NOT_FOUND";
pub const TRANSFER_FAILED: &str = "TRANSFER_FAILED";
pub const UNKNOWN: &str = "UNKNOWN";

/// Closed set of verdicts; unrecognised codes collapse to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Authentic,
    AlreadyOwned,
    Expired,
    CounterfeitSuspected,
    TamperedQr,
    ValidationError,
    InvalidQrFormat,
    NetworkError,
    SystemError,
    AssetNotFound,
    TransferFailed,
    Unknown,
}

impl Verdict {
    pub fn from_code(code: &str) -> Self {
        match code {
            AUTHENTIC => Verdict::Authentic,
            ALREADY_OWNED => Verdict::AlreadyOwned,
            EXPIRED => Verdict::Expired,
            COUNTERFEIT_SUSPECTED => Verdict::CounterfeitSuspected,
            TAMPERED_QR => Verdict::TamperedQr,
            VALIDATION_ERROR => Verdict::ValidationError,
            INVALID_QR_FORMAT => Verdict::InvalidQrFormat,
            NETWORK_ERROR => Verdict::NetworkError,
            SYSTEM_ERROR => Verdict::SystemError,
            ASSET_NOT_FOUND => Verdict::AssetNotFound,
            TRANSFER_FAILED => Verdict::TransferFailed,
            _ => Verdict::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Authentic => AUTHENTIC,
            Verdict::AlreadyOwned => ALREADY_OWNED,
            Verdict::Expired => EXPIRED,
            Verdict::CounterfeitSuspected => COUNTERFEIT_SUSPECTED,
            Verdict::TamperedQr => TAMPERED_QR,
            Verdict::ValidationError => VALIDATION_ERROR,
            Verdict::InvalidQrFormat => INVALID_QR_FORMAT,
            Verdict::NetworkError => NETWORK_ERROR,
            Verdict::SystemError => SYSTEM_ERROR,
            Verdict::AssetNotFound => ASSET_NOT_FOUND,
            Verdict::TransferFailed => TRANSFER_FAILED,
            Verdict::Unknown => UNKNOWN,
        }
    }

    /// True for failures of the app or transport rather than verdicts on the medicine.
    pub fn is_local_failure(&self) -> bool {
        matches!(self, Verdict::NetworkError | Verdict::SystemError)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Critical,
    /// App or transport failure; not a verdict on the medicine.
    Failure,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Success,
    Info,
    Warning,
    Destructive,
    Failure,
    Muted,
}

/// How a verdict is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDescriptor {
    pub verdict: Verdict,
    pub severity: Severity,
    pub icon: &'static str,
    pub label: &'static str,
    pub color_role: ColorRole,
}

/// Total mapping from a raw status code to its descriptor.
pub fn classify(code: &str) -> StatusDescriptor {
    describe(Verdict::from_code(code))
}

pub fn describe(verdict: Verdict) -> StatusDescriptor {
    let (severity, icon, label, color_role) = match verdict {
        Verdict::Authentic => (Severity::Success, "verified-user", "Authentic Medicine", ColorRole::Success),
        Verdict::AlreadyOwned => (Severity::Info, "check-circle", "Already Verified", ColorRole::Info),
        Verdict::Expired => (Severity::Warning, "schedule", "Expired Medicine", ColorRole::Warning),
        Verdict::CounterfeitSuspected => {
            (Severity::Critical, "gpp-bad", "DANGER - Counterfeit Suspected", ColorRole::Destructive)
        }
        Verdict::TamperedQr => (Severity::Critical, "qr-code", "Tampered QR Code", ColorRole::Destructive),
        Verdict::ValidationError => (Severity::Warning, "error-outline", "Validation Error", ColorRole::Warning),
        Verdict::InvalidQrFormat => {
            (Severity::Warning, "qr-code-scanner", "Invalid QR Format", ColorRole::Warning)
        }
        Verdict::NetworkError => (Severity::Failure, "wifi-off", "Network Error", ColorRole::Failure),
        Verdict::SystemError => (Severity::Failure, "bug-report", "System Error", ColorRole::Failure),
        Verdict::AssetNotFound => (Severity::Warning, "search-off", "Medicine Not Found", ColorRole::Warning),
        Verdict::TransferFailed => (Severity::Warning, "sync-disabled", "Transfer Failed", ColorRole::Warning),
        Verdict::Unknown => (Severity::Neutral, "help-outline", "Unknown Status", ColorRole::Muted),
    };
    StatusDescriptor { verdict, severity, icon, label, color_role }
}
