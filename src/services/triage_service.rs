//! Sync/triage orchestration.
//!
//! Merge reconciles externally fetched issues against the store; triage
//! derives classification and priority fields over everything stored.
//! Both are idempotent: merging the same batch twice changes nothing,
//! and re-running triage at the same instant produces identical derived
//! fields.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::github::GitHubClient;
use crate::domain::errors::DomainResult;
use crate::domain::models::{Issue, IssueStatus};
use crate::domain::ports::{IssueRepository, LabelPredictor};
use crate::services::scorer::PriorityScorer;

/// Outcome of a sync pass.
#[derive(Debug, Clone, Copy)]
pub struct SyncSummary {
    /// Issues returned by the fetcher (possibly a partial result).
    pub fetched: usize,
    /// Issues not previously present in the store.
    pub new_count: usize,
}

/// Orchestrates fetch-merge (sync) and classify-score (triage) passes.
pub struct TriageService<R: IssueRepository> {
    repository: Arc<R>,
    predictor: Arc<dyn LabelPredictor>,
    scorer: PriorityScorer,
    github: GitHubClient,
}

impl<R: IssueRepository> TriageService<R> {
    pub fn new(
        repository: Arc<R>,
        predictor: Arc<dyn LabelPredictor>,
        github: GitHubClient,
    ) -> Self {
        Self {
            repository,
            predictor,
            scorer: PriorityScorer::new(),
            github,
        }
    }

    /// Fetch open issues from `repository` and merge them into the
    /// store. Fetch failures yield a partial batch (already logged by
    /// the client); the merge still runs over whatever arrived.
    pub async fn sync(&self, repository: &str) -> DomainResult<SyncSummary> {
        tracing::info!(repository, "starting issue sync");
        let fetched = self.github.fetch_issues(repository).await;
        let fetched_count = fetched.len();

        let new_count = self.merge(fetched, repository).await?;
        tracing::info!(
            repository,
            fetched = fetched_count,
            new = new_count,
            "sync complete"
        );

        Ok(SyncSummary {
            fetched: fetched_count,
            new_count,
        })
    }

    /// Merge fetched issues into the store. Returns the number of
    /// newly inserted issues.
    ///
    /// Unseen ids are inserted with default derived fields and tagged
    /// with the source repository. Already-present ids keep their
    /// stored record (derived fields never regress); only an absent
    /// `repository` tag is backfilled. Nothing is removed because it
    /// vanished from the fetch result.
    pub async fn merge(&self, fetched: Vec<Issue>, repository: &str) -> DomainResult<usize> {
        let mut by_id: HashMap<i64, Issue> = self
            .repository
            .get_all()
            .await?
            .into_iter()
            .map(|issue| (issue.id, issue))
            .collect();

        let mut new_count = 0;
        for mut issue in fetched {
            match by_id.get_mut(&issue.id) {
                Some(existing) => {
                    if existing.repository.is_none() {
                        existing.repository = Some(repository.to_string());
                    }
                }
                None => {
                    issue.repository = Some(repository.to_string());
                    by_id.insert(issue.id, issue);
                    new_count += 1;
                }
            }
        }

        let merged: Vec<Issue> = by_id.into_values().collect();
        self.repository.upsert_many(&merged).await?;
        Ok(new_count)
    }

    /// Run classification and scoring over the entire store.
    ///
    /// Every stored issue is re-triaged on every pass, not just
    /// `status=new` ones: the score depends on elapsed age and goes
    /// stale otherwise. A classifier failure aborts the pass before any
    /// write. Returns the number of issues processed.
    pub async fn triage(&self) -> DomainResult<usize> {
        let mut issues = self.repository.get_all().await?;
        if issues.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = issues.iter().map(Issue::triage_text).collect();
        let predictions = self.predictor.predict(&texts)?;

        for (issue, label) in issues.iter_mut().zip(predictions) {
            issue.predicted_label = Some(label);
            issue.priority_score = self.scorer.score(issue);
            issue.status = IssueStatus::Triaged;
        }

        self.repository.upsert_many(&issues).await?;
        tracing::info!(processed = issues.len(), "triage pass complete");
        Ok(issues.len())
    }

    /// Apply an issue delivered by a webhook event.
    ///
    /// Unknown ids are inserted with default derived fields; known ids
    /// have their mirrored fields refreshed while derived fields and
    /// the repository tag are preserved. The next triage sweep picks
    /// the record up either way.
    pub async fn apply_webhook_issue(&self, incoming: Issue) -> DomainResult<()> {
        let merged = match self.repository.get(incoming.id).await? {
            Some(existing) => Issue {
                repository: existing.repository,
                status: existing.status,
                predicted_label: existing.predicted_label,
                priority_score: existing.priority_score,
                manual_correction: existing.manual_correction,
                ..incoming
            },
            None => incoming,
        };
        self.repository.upsert(&merged).await
    }
}
