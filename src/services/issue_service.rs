//! Query-side operations over the issue store: listing, statistics,
//! manual label correction, and CSV export.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Issue, IssueStatus};
use crate::domain::ports::IssueRepository;

/// Filters for issue listing.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub status: Option<IssueStatus>,
    pub min_score: i64,
    pub repository: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

/// A page of issues, with the post-filter pre-pagination total.
#[derive(Debug, Clone)]
pub struct IssuePage {
    pub total: usize,
    pub items: Vec<Issue>,
}

/// Aggregated store statistics.
#[derive(Debug, Clone)]
pub struct IssueStats {
    pub total: i64,
    pub status_counts: HashMap<String, i64>,
    pub label_counts: HashMap<String, i64>,
}

/// Fixed column set for the CSV export.
const EXPORT_COLUMNS: [&str; 9] = [
    "id",
    "number",
    "title",
    "state",
    "status",
    "predicted_label",
    "priority_score",
    "created_at",
    "html_url",
];

pub struct IssueService<R: IssueRepository> {
    repository: Arc<R>,
}

impl<R: IssueRepository> IssueService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List issues matching the filters, sorted by priority score
    /// descending, paginated by `limit`/`offset`.
    pub async fn list(&self, filters: &ListFilters) -> DomainResult<IssuePage> {
        let mut matching: Vec<Issue> = self
            .repository
            .get_all()
            .await?
            .into_iter()
            .filter(|issue| {
                filters.status.is_none_or(|s| issue.status == s)
                    && issue.priority_score >= filters.min_score
                    && filters
                        .repository
                        .as_deref()
                        .is_none_or(|r| issue.repository.as_deref() == Some(r))
            })
            .collect();

        // Descending by score; id as a stable tiebreaker.
        matching.sort_by(|a, b| {
            b.priority_score
                .cmp(&a.priority_score)
                .then(a.id.cmp(&b.id))
        });

        let total = matching.len();
        let items: Vec<Issue> = matching
            .into_iter()
            .skip(filters.offset)
            .take(filters.limit)
            .collect();

        Ok(IssuePage { total, items })
    }

    /// Counts grouped by status and by predicted label.
    pub async fn stats(&self) -> DomainResult<IssueStats> {
        let status_counts = self.repository.count_by_status().await?;
        let label_counts = self.repository.count_by_label().await?;
        let total = status_counts.values().sum();

        Ok(IssueStats {
            total,
            status_counts,
            label_counts,
        })
    }

    /// Manually override the predicted label for an issue, flagging it
    /// for future retraining.
    pub async fn update_label(&self, id: i64, label: String) -> DomainResult<Issue> {
        let mut issue = self
            .repository
            .get(id)
            .await?
            .ok_or(DomainError::IssueNotFound(id))?;

        issue.predicted_label = Some(label);
        issue.manual_correction = true;
        self.repository.upsert(&issue).await?;
        Ok(issue)
    }

    /// Dump the full store as CSV with a fixed column set.
    pub async fn export_csv(&self) -> DomainResult<String> {
        let issues = self.repository.get_all().await?;

        let mut out = String::new();
        out.push_str(&EXPORT_COLUMNS.join(","));
        out.push('\n');

        for issue in &issues {
            let fields = [
                issue.id.to_string(),
                issue.number.to_string(),
                issue.title.clone(),
                issue.state.clone(),
                issue.status.as_str().to_string(),
                issue.predicted_label.clone().unwrap_or_default(),
                issue.priority_score.to_string(),
                issue.created_at.clone(),
                issue.html_url.clone(),
            ];
            let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        Ok(out)
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
