//! API-key authentication for protected routes.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::handlers::ErrorResponse;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request unless the `X-API-Key` header matches the
/// configured key.
pub fn require_api_key(
    headers: &HeaderMap,
    expected: &str,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != expected {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid API key".to_string(),
                code: "AUTH_ERROR".to_string(),
            }),
        ));
    }
    Ok(())
}
