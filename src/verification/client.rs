//! Verify-endpoint client
//!
//! `verify` is total: transport errors, timeouts, non-2xx statuses and
//! unreadable bodies all come back as a `VerificationResult` with
//! `success = false` and a locally synthesized status.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::response::{failure_result, invalid_payload_result, normalize, ParsedResponse, ScanContext};
use crate::core::config::VerificationConfig;
use crate::core::domain::VerificationResult;
use crate::core::errors::VerificationFailure;
use crate::wallet::address::shorten_address;

/// Request body of the verify endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    recipient_wallet: &'a str,
    encrypted_asset: &'a str,
}

/// Verify-endpoint client
#[derive(Debug, Clone)]
pub struct VerificationClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl VerificationClient {
    pub fn new(config: &VerificationConfig) -> Self {
        Self::with_timeout(&config.endpoint, config.timeout())
    }

    /// Client for `endpoint` with a bounded wait of `timeout` per verification.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { client, endpoint: endpoint.to_string(), timeout }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Verify `payload` on behalf of the canonical `address`. Never fails.
    ///
    /// Repeat scans are sent every time; the ledger decides whether an asset
    /// is already owned.
    pub async fn verify(&self, address: &str, payload: &str, scan_type: &str) -> VerificationResult {
        let ctx = ScanContext::new(address, payload, scan_type);
        if payload.trim().is_empty() {
            warn!("refusing to verify an empty payload");
            return invalid_payload_result(&ctx);
        }

        let started = Instant::now();
        info!(
            wallet = %shorten_address(address),
            endpoint = %self.endpoint,
            "sending verification request"
        );

        let result = match tokio::time::timeout(self.timeout, self.send(address, payload)).await {
            Err(_) => {
                let failure = VerificationFailure::Timeout(self.timeout_ms());
                warn!(error = %failure, "verification timed out");
                failure_result(&failure, &ctx, None)
            }
            Ok(Err(failure)) => {
                warn!(error = %failure, "verification transport failed");
                failure_result(&failure, &ctx, None)
            }
            Ok(Ok((http_status, body))) => {
                let parsed = ParsedResponse::parse(http_status, &body);
                if let ParsedResponse::Malformed { reason, .. } = &parsed {
                    warn!(http_status, reason = %reason, "malformed verification response");
                }
                normalize(parsed, &ctx)
            }
        };

        if !result.success {
            let rejection = VerificationFailure::RemoteRejected {
                code: result.drug_info.status.clone(),
                message: result.message.clone(),
            };
            debug!(error = %rejection, "verification unsuccessful");
        }
        info!(
            status = %result.drug_info.status,
            success = result.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "verification finished"
        );
        result
    }

    async fn send(&self, address: &str, payload: &str) -> Result<(u16, String), VerificationFailure> {
        let request = VerifyRequest { recipient_wallet: address, encrypted_asset: payload };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerificationFailure::Timeout(self.timeout_ms())
                } else {
                    VerificationFailure::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| VerificationFailure::Network(format!("failed to read response body: {}", e)))?;
        debug!(http_status = status, bytes = body.len(), "verification response received");
        Ok((status, body))
    }
}
