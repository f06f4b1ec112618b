//! SQLite implementation of the IssueRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Issue, IssueStatus};
use crate::domain::ports::IssueRepository;

#[derive(Clone)]
pub struct SqliteIssueRepository {
    pool: SqlitePool,
}

impl SqliteIssueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single-statement upsert. The `COALESCE` on `repository` keeps
    /// the stored tag when the input carries none, so a tag set once is
    /// never cleared. One statement per row keeps each write atomic.
    async fn upsert_row(&self, issue: &Issue) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO issues
               (id, number, title, body, state, created_at, html_url,
                repository, status, predicted_label, priority_score, manual_correction)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   number = excluded.number,
                   title = excluded.title,
                   body = excluded.body,
                   state = excluded.state,
                   created_at = excluded.created_at,
                   html_url = excluded.html_url,
                   repository = COALESCE(excluded.repository, issues.repository),
                   status = excluded.status,
                   predicted_label = excluded.predicted_label,
                   priority_score = excluded.priority_score,
                   manual_correction = excluded.manual_correction"#,
        )
        .bind(issue.id)
        .bind(issue.number)
        .bind(&issue.title)
        .bind(&issue.body)
        .bind(&issue.state)
        .bind(&issue.created_at)
        .bind(&issue.html_url)
        .bind(&issue.repository)
        .bind(issue.status.as_str())
        .bind(&issue.predicted_label)
        .bind(issue.priority_score)
        .bind(issue.manual_correction)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl IssueRepository for SqliteIssueRepository {
    async fn get(&self, id: i64) -> DomainResult<Option<Issue>> {
        let row: Option<IssueRow> = sqlx::query_as("SELECT * FROM issues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Issue::try_from).transpose()
    }

    async fn get_all(&self) -> DomainResult<Vec<Issue>> {
        let rows: Vec<IssueRow> = sqlx::query_as("SELECT * FROM issues")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Issue::try_from).collect()
    }

    async fn upsert(&self, issue: &Issue) -> DomainResult<()> {
        self.upsert_row(issue).await
    }

    async fn upsert_many(&self, issues: &[Issue]) -> DomainResult<()> {
        for issue in issues {
            self.upsert_row(issue).await?;
        }
        Ok(())
    }

    async fn count_by_status(&self) -> DomainResult<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM issues GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn count_by_label(&self) -> DomainResult<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT COALESCE(predicted_label, 'unlabeled'), COUNT(*)
             FROM issues GROUP BY COALESCE(predicted_label, 'unlabeled')",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

/// Raw row shape; decoded into the domain model via `TryFrom`.
#[derive(Debug, sqlx::FromRow)]
struct IssueRow {
    id: i64,
    number: i64,
    title: String,
    body: String,
    state: String,
    created_at: String,
    html_url: String,
    repository: Option<String>,
    status: String,
    predicted_label: Option<String>,
    priority_score: i64,
    manual_correction: bool,
}

impl TryFrom<IssueRow> for Issue {
    type Error = DomainError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        let status = IssueStatus::from_str(&row.status).ok_or_else(|| {
            DomainError::Database(format!(
                "issue {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Ok(Issue {
            id: row.id,
            number: row.number,
            title: row.title,
            body: row.body,
            state: row.state,
            created_at: row.created_at,
            html_url: row.html_url,
            repository: row.repository,
            status,
            predicted_label: row.predicted_label,
            priority_score: row.priority_score,
            manual_correction: row.manual_correction,
        })
    }
}
