//! Parsing and normalization of verify-endpoint responses.
//!
//! Whatever the endpoint sends back, `normalize` produces a complete
//! `VerificationResult`; defaults are applied here once instead of at each
//! call site.

use serde_json::{Map, Value};

use super::status::{Verdict, INVALID_QR_FORMAT, UNKNOWN};
use crate::core::domain::{
    CounterpartyWallets, DrugInfo, ErrorCode, VerificationResult, UNKNOWN_MEDICINE,
};
use crate::core::errors::VerificationFailure;

/// Response body after the transport step.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// Body is a JSON object.
    Ok { http_status: u16, body: Value },
    /// Body is empty, not JSON, or JSON that is not an object.
    Malformed { http_status: u16, raw: String, reason: String },
}

impl ParsedResponse {
    pub fn parse(http_status: u16, raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(body) if body.is_object() => ParsedResponse::Ok { http_status, body },
            Ok(_) => ParsedResponse::Malformed {
                http_status,
                raw: raw.to_string(),
                reason: "response body is not a JSON object".to_string(),
            },
            Err(e) => ParsedResponse::Malformed { http_status, raw: raw.to_string(), reason: e.to_string() },
        }
    }
}

/// Per-scan values the normalizer needs.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub payload: String,
    pub requesting_wallet: String,
    pub scan_type: String,
    pub timestamp_iso: String,
}

impl ScanContext {
    pub fn new(requesting_wallet: &str, payload: &str, scan_type: &str) -> Self {
        Self {
            payload: payload.to_string(),
            requesting_wallet: requesting_wallet.to_string(),
            scan_type: scan_type.to_string(),
            timestamp_iso: chrono::Utc::now().to_rfc3339(),
        }
    }
}

const DRUG_INFO_FIELDS: &[&str] = &[
    "name",
    "symbol",
    "assetAddress",
    "status",
    "expiryDate",
    "manufacturer",
    "serialNumber",
    "batchNumber",
];

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn error_code_of(value: Option<&Value>) -> Option<ErrorCode> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(ErrorCode::Text(s.trim().to_string())),
        Value::Number(n) => n.as_i64().map(ErrorCode::Number),
        _ => None,
    }
}

fn object_of<'a>(value: Option<&'a Value>) -> Option<&'a Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Error code the body reports, if any: `errorCode` at top level or under
/// `data`, else the drug status.
pub fn reported_code(body: &Value) -> Option<String> {
    let top = body.as_object()?;
    let data = object_of(top.get("data"));
    let code = error_code_of(top.get("errorCode"))
        .or_else(|| data.and_then(|d| error_code_of(d.get("errorCode"))))
        .map(|code| code.to_string());
    code.or_else(|| {
        data.and_then(|d| object_of(d.get("drugInfo")))
            .and_then(|drug| non_empty_str(drug, "status"))
    })
}

fn drug_info_from(drug: &Map<String, Value>, ctx: &ScanContext, fallback_status: String) -> DrugInfo {
    let extra = drug
        .iter()
        .filter(|(key, _)| !DRUG_INFO_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    DrugInfo {
        name: non_empty_str(drug, "name").unwrap_or_else(|| UNKNOWN_MEDICINE.to_string()),
        symbol: non_empty_str(drug, "symbol"),
        asset_address: non_empty_str(drug, "assetAddress").unwrap_or_else(|| ctx.payload.clone()),
        status: non_empty_str(drug, "status").unwrap_or(fallback_status),
        expiry_date: non_empty_str(drug, "expiryDate"),
        manufacturer: non_empty_str(drug, "manufacturer"),
        serial_number: non_empty_str(drug, "serialNumber"),
        batch_number: non_empty_str(drug, "batchNumber"),
        extra,
    }
}

/// Build a result from a JSON object body. `transport_ok` is false for non-2xx
/// responses, which can never count as a successful verification.
pub fn normalize_body(body: Value, transport_ok: bool, ctx: &ScanContext) -> VerificationResult {
    let empty = Map::new();
    let top = body.as_object().unwrap_or(&empty);
    let data = object_of(top.get("data")).unwrap_or(&empty);
    let drug = object_of(data.get("drugInfo")).unwrap_or(&empty);

    let success = transport_ok && top.get("success").and_then(Value::as_bool).unwrap_or(false);
    let error_code = error_code_of(top.get("errorCode")).or_else(|| error_code_of(data.get("errorCode")));

    let fallback_status = match (&error_code, success) {
        (Some(code), false) => code.to_string(),
        _ => UNKNOWN.to_string(),
    };
    let drug_info = drug_info_from(drug, ctx, fallback_status);

    let message = non_empty_str(top, "message").unwrap_or_else(|| {
        if success { "Verification completed".to_string() } else { "Verification failed".to_string() }
    });
    let counterparty_wallets = CounterpartyWallets {
        from: non_empty_str(data, "fromWallet"),
        to: non_empty_str(data, "toWallet"),
        current_owner: non_empty_str(data, "currentOwner"),
        expected_owner: non_empty_str(data, "expectedOwner"),
    };
    let requesting_wallet =
        non_empty_str(data, "requestingWallet").unwrap_or_else(|| ctx.requesting_wallet.clone());
    let metadata = object_of(data.get("metadata")).cloned().unwrap_or_default();
    let security_alert = non_empty_str(data, "securityAlert");
    let transaction_signature = non_empty_str(data, "transactionSignature");

    VerificationResult {
        success,
        message,
        drug_info,
        counterparty_wallets,
        requesting_wallet,
        metadata,
        error_code,
        timestamp_iso: ctx.timestamp_iso.clone(),
        scan_type: ctx.scan_type.clone(),
        security_alert,
        transaction_signature,
        raw_response: Some(body),
    }
}

/// Result for a failure detected locally (transport, timeout, bad body).
pub fn failure_result(failure: &VerificationFailure, ctx: &ScanContext, raw: Option<Value>) -> VerificationResult {
    VerificationResult {
        success: false,
        message: failure.user_message(),
        drug_info: DrugInfo::placeholder(&ctx.payload, failure.status_code()),
        counterparty_wallets: CounterpartyWallets::default(),
        requesting_wallet: ctx.requesting_wallet.clone(),
        metadata: Map::new(),
        error_code: Some(ErrorCode::Text(failure.error_code())),
        timestamp_iso: ctx.timestamp_iso.clone(),
        scan_type: ctx.scan_type.clone(),
        security_alert: None,
        transaction_signature: None,
        raw_response: raw,
    }
}

/// Result for a blank scan payload; nothing is sent to the ledger.
pub fn invalid_payload_result(ctx: &ScanContext) -> VerificationResult {
    VerificationResult {
        success: false,
        message: "The scanned QR code is empty or unreadable.".to_string(),
        drug_info: DrugInfo::placeholder(&ctx.payload, INVALID_QR_FORMAT),
        counterparty_wallets: CounterpartyWallets::default(),
        requesting_wallet: ctx.requesting_wallet.clone(),
        metadata: Map::new(),
        error_code: Some(ErrorCode::Text(INVALID_QR_FORMAT.to_string())),
        timestamp_iso: ctx.timestamp_iso.clone(),
        scan_type: ctx.scan_type.clone(),
        security_alert: None,
        transaction_signature: None,
        raw_response: None,
    }
}

/// Fold any parsed response into a result.
pub fn normalize(parsed: ParsedResponse, ctx: &ScanContext) -> VerificationResult {
    match parsed {
        ParsedResponse::Ok { http_status, body } if (200..300).contains(&http_status) => {
            normalize_body(body, true, ctx)
        }
        ParsedResponse::Ok { http_status, body } => {
            let failure = VerificationFailure::HttpStatus(http_status);
            let Some(code) = reported_code(&body) else {
                return failure_result(&failure, ctx, Some(body));
            };
            let mut result = normalize_body(body, false, ctx);
            // A failed request can never vouch for the medicine.
            if Verdict::from_code(result.status()) == Verdict::Authentic {
                let raw = result.raw_response.take();
                return failure_result(&failure, ctx, raw);
            }
            if result.error_code.is_none() {
                result.error_code = Some(ErrorCode::Text(code));
            }
            result
        }
        ParsedResponse::Malformed { http_status, raw, reason } => {
            let failure = if (200..300).contains(&http_status) {
                VerificationFailure::MalformedResponse(reason)
            } else {
                VerificationFailure::HttpStatus(http_status)
            };
            let raw = if raw.is_empty() { None } else { Some(Value::String(raw)) };
            failure_result(&failure, ctx, raw)
        }
    }
}
