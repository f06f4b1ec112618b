use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::Issue;

/// Repository port for issue persistence.
///
/// Upserts are field-merge writes: an absent `repository` tag on the
/// input never clears a stored tag, and each row write is atomic, so
/// concurrent writers touching the same `id` cannot interleave a
/// partial update. Issues are never deleted.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Get an issue by its external id.
    async fn get(&self, id: i64) -> DomainResult<Option<Issue>>;

    /// Full scan of the store. No ordering guarantee.
    async fn get_all(&self) -> DomainResult<Vec<Issue>>;

    /// Insert the issue if absent, otherwise overwrite its mirrored
    /// and derived fields (repository tag backfilled only if absent).
    async fn upsert(&self, issue: &Issue) -> DomainResult<()>;

    /// [`upsert`](Self::upsert) applied to each item of the batch.
    async fn upsert_many(&self, issues: &[Issue]) -> DomainResult<()>;

    /// Issue counts grouped by status.
    async fn count_by_status(&self) -> DomainResult<HashMap<String, i64>>;

    /// Issue counts grouped by predicted label; unlabeled issues are
    /// grouped under `"unlabeled"`.
    async fn count_by_label(&self) -> DomainResult<HashMap<String, i64>>;
}
