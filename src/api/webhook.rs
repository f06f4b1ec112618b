//! GitHub webhook receiver.
//!
//! Verifies the `X-Hub-Signature-256` HMAC over the raw request body
//! before any processing, then merges the delivered issue into the
//! store and schedules a background triage sweep.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::adapters::github::WebhookPayload;
use crate::domain::ports::IssueRepository;

use super::handlers::{domain_error_response, ErrorResponse};
use super::AppState;

/// Header carrying the GitHub signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: String,
}

/// Verify a GitHub `sha256=<hex>` signature over the payload.
///
/// Uses the Mac verifier's constant-time comparison.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `sha256=<hex>` signature GitHub would send for a body.
/// Used by tests and tooling.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// `POST /webhook` — handle a GitHub issue event.
pub async fn github_webhook<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(secret) = state.github.webhook_secret.as_deref() else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Webhook secret not configured".to_string(),
                code: "CONFIG_ERROR".to_string(),
            }),
        ));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(secret, &body, signature) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Missing or invalid signature".to_string(),
                code: "AUTH_ERROR".to_string(),
            }),
        ));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Malformed webhook payload: {e}"),
                code: "VALIDATION_ERROR".to_string(),
            }),
        )
    })?;

    let relevant = payload.is_relevant();
    if let Some(gh_issue) = payload.issue.filter(|_| relevant) {
        let issue = gh_issue.into_issue();

        state
            .triage
            .apply_webhook_issue(issue)
            .await
            .map_err(|e| domain_error_response(&e))?;

        // The new or refreshed record is picked up by a background
        // triage sweep; its failure is logged, not surfaced.
        let triage = state.triage.clone();
        tokio::spawn(async move {
            if let Err(err) = triage.triage().await {
                tracing::error!(error = %err, "webhook-triggered triage failed");
            }
        });
    }

    Ok(Json(WebhookResponse {
        message: "Webhook received".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip_verifies() {
        let secret = "topsecret";
        let body = br#"{"action":"opened"}"#;
        let signature = sign_payload(secret, body);
        assert!(verify_signature(secret, body, &signature));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let secret = "topsecret";
        let signature = sign_payload(secret, b"original");
        assert!(!verify_signature(secret, b"tampered", &signature));
    }

    #[test]
    fn malformed_signature_fails_verification() {
        assert!(!verify_signature("s", b"body", ""));
        assert!(!verify_signature("s", b"body", "sha1=abcd"));
        assert!(!verify_signature("s", b"body", "sha256=not-hex"));
    }
}
