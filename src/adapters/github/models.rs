//! GitHub Issues API wire models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. They are
//! internal to the GitHub adapter and are not part of the domain model.

use serde::{Deserialize, Serialize};

use crate::domain::models::{Issue, IssueStatus};

/// An issue returned by the GitHub API.
///
/// Note: issues and pull requests share the same endpoint. Pull requests
/// include a non-null `pull_request` field; the fetcher skips those.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Unique numeric identifier for the issue.
    pub id: i64,
    /// Sequential number within the repository (e.g., 42 → "#42").
    pub number: i64,
    /// Issue title.
    pub title: String,
    /// Issue body text (may be absent or null).
    #[serde(default)]
    pub body: Option<String>,
    /// Current state: "open" or "closed".
    pub state: String,
    /// ISO 8601 timestamp of creation.
    pub created_at: String,
    /// URL to view the issue in the GitHub UI.
    pub html_url: String,
    /// Labels applied to the issue.
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    /// Present when this item is actually a pull request, not an issue.
    #[serde(default)]
    pub pull_request: Option<GitHubPullRequestRef>,
}

impl GitHubIssue {
    /// Map to a domain [`Issue`] with default derived fields.
    ///
    /// The merge step decides whether those defaults survive (new
    /// record) or the stored derived fields win (existing record).
    pub fn into_issue(self) -> Issue {
        Issue {
            id: self.id,
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            state: self.state,
            created_at: self.created_at,
            html_url: self.html_url,
            repository: None,
            status: IssueStatus::New,
            predicted_label: None,
            priority_score: 0,
            manual_correction: false,
        }
    }
}

/// A label applied to a GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    /// The label name (e.g., "bug", "priority: high").
    pub name: String,
}

/// Reference object present on pull requests (absent on plain issues).
///
/// The fetcher uses this to filter out PRs from the issue list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPullRequestRef {
    /// API URL of the pull request resource.
    #[serde(default)]
    pub url: Option<String>,
}

/// Webhook payload delivered by GitHub for issue events.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// The event action: "opened", "edited", "closed", ...
    #[serde(default)]
    pub action: Option<String>,
    /// The issue the event refers to, when present.
    #[serde(default)]
    pub issue: Option<GitHubIssue>,
}

impl WebhookPayload {
    /// Whether this event should create or update a stored issue.
    pub fn is_relevant(&self) -> bool {
        matches!(
            self.action.as_deref(),
            Some("opened" | "reopened" | "edited")
        ) && self.issue.is_some()
    }
}
