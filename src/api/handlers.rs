//! Request handlers for the triage API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::models::{Issue, IssueStatus};
use crate::domain::ports::IssueRepository;
use crate::services::ListFilters;

use super::auth::require_api_key;
use super::rate_limit::ClientAddr;
use super::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error to the matching HTTP status and error code.
pub fn domain_error_response(err: &DomainError) -> ApiError {
    let (status, code) = match err {
        DomainError::ModelUnavailable => (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_UNAVAILABLE"),
        DomainError::IssueNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        DomainError::AuthFailed(_) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
        DomainError::TransientFetch(_) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR"),
        DomainError::Database(_) | DomainError::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

fn rate_limit_exceeded() -> ApiError {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: "Rate limit exceeded, try again later".to_string(),
            code: "RATE_LIMITED".to_string(),
        }),
    )
}

/// An issue as presented by the API.
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub created_at: String,
    pub html_url: String,
    pub repository: Option<String>,
    pub status: String,
    pub predicted_label: Option<String>,
    pub priority_score: i64,
    pub manual_correction: bool,
}

impl From<Issue> for IssueResponse {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            number: issue.number,
            title: issue.title,
            body: issue.body,
            state: issue.state,
            created_at: issue.created_at,
            html_url: issue.html_url,
            repository: issue.repository,
            status: issue.status.as_str().to_string(),
            predicted_label: issue.predicted_label,
            priority_score: issue.priority_score,
            manual_correction: issue.manual_correction,
        }
    }
}

/// Query parameters for the sync trigger.
#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TriageResponse {
    pub message: String,
    pub processed_count: usize,
}

/// Query parameters for issue listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub min_score: i64,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub items: Vec<IssueResponse>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: i64,
    pub status_counts: HashMap<String, i64>,
    pub label_counts: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub struct LabelUpdateRequest {
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct LabelUpdateResponse {
    pub message: String,
    pub issue: IssueResponse,
}

// Handler functions

pub async fn health_check() -> &'static str {
    "OK"
}

/// `POST /sync` — accept and run a fetch-merge pass in the background.
///
/// The response only acknowledges acceptance; callers poll the store
/// afterwards to observe results. Sync failures are logged, never
/// surfaced.
pub async fn trigger_sync<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ClientAddr(client): ClientAddr,
    headers: HeaderMap,
    Query(params): Query<SyncParams>,
) -> Result<(StatusCode, Json<SyncResponse>), ApiError> {
    require_api_key(&headers, &state.api_key)?;
    if !state.sync_limiter.check(client) {
        return Err(rate_limit_exceeded());
    }

    let repository = params
        .repo
        .or_else(|| state.github.repository.clone())
        .ok_or_else(|| {
            domain_error_response(&DomainError::ValidationFailed(
                "repository not specified and no default configured".to_string(),
            ))
        })?;

    let triage = state.triage.clone();
    let target = repository.clone();
    tokio::spawn(async move {
        if let Err(err) = triage.sync(&target).await {
            tracing::error!(repository = %target, error = %err, "background sync failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(SyncResponse {
            message: format!("Issue synchronization started for {repository}"),
        }),
    ))
}

/// `POST /triage` — classify and score every stored issue.
pub async fn trigger_triage<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ClientAddr(client): ClientAddr,
    headers: HeaderMap,
) -> Result<Json<TriageResponse>, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    if !state.triage_limiter.check(client) {
        return Err(rate_limit_exceeded());
    }

    let processed_count = state
        .triage
        .triage()
        .await
        .map_err(|e| domain_error_response(&e))?;

    Ok(Json(TriageResponse {
        message: "Triage complete".to_string(),
        processed_count,
    }))
}

/// `GET /issues` — list issues sorted by priority score descending.
pub async fn list_issues<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    require_api_key(&headers, &state.api_key)?;

    let status = match &params.status {
        Some(raw) => Some(IssueStatus::from_str(raw).ok_or_else(|| {
            domain_error_response(&DomainError::ValidationFailed(format!(
                "unknown status '{raw}'"
            )))
        })?),
        None => None,
    };

    let filters = ListFilters {
        status,
        min_score: params.min_score,
        repository: params.repository.clone(),
        limit: params.limit,
        offset: params.offset,
    };

    let page = state
        .issues
        .list(&filters)
        .await
        .map_err(|e| domain_error_response(&e))?;

    Ok(Json(ListResponse {
        total: page.total,
        limit: params.limit,
        offset: params.offset,
        items: page.items.into_iter().map(IssueResponse::from).collect(),
    }))
}

/// `GET /stats` — issue counts grouped by status and label.
pub async fn get_stats<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    require_api_key(&headers, &state.api_key)?;

    let stats = state
        .issues
        .stats()
        .await
        .map_err(|e| domain_error_response(&e))?;

    Ok(Json(StatsResponse {
        total: stats.total,
        status_counts: stats.status_counts,
        label_counts: stats.label_counts,
    }))
}

/// `PATCH /issues/{id}` — manually correct a predicted label.
pub async fn update_label<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<LabelUpdateRequest>,
) -> Result<Json<LabelUpdateResponse>, ApiError> {
    require_api_key(&headers, &state.api_key)?;

    let issue = state
        .issues
        .update_label(id, req.label)
        .await
        .map_err(|e| domain_error_response(&e))?;

    Ok(Json(LabelUpdateResponse {
        message: "Label updated".to_string(),
        issue: IssueResponse::from(issue),
    }))
}

/// `GET /export` — full dump as a CSV attachment.
pub async fn export_issues<R: IssueRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_api_key(&headers, &state.api_key)?;

    let csv = state
        .issues
        .export_csv()
        .await
        .map_err(|e| domain_error_response(&e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=issues_export.csv",
            ),
        ],
        csv,
    )
        .into_response())
}
