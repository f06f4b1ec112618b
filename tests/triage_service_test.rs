mod helpers;

use std::sync::Arc;

use issuepilot::adapters::github::GitHubClient;
use issuepilot::adapters::sqlite::SqliteIssueRepository;
use issuepilot::domain::errors::{DomainError, DomainResult};
use issuepilot::domain::models::IssueStatus;
use issuepilot::domain::ports::{IssueRepository, LabelPredictor};
use issuepilot::services::TriageService;

use helpers::database::{setup_test_db, teardown_test_db};
use helpers::make_issue;

/// Predictor that labels everything with a fixed string.
struct FixedPredictor(&'static str);

impl LabelPredictor for FixedPredictor {
    fn predict(&self, texts: &[String]) -> DomainResult<Vec<String>> {
        Ok(texts.iter().map(|_| self.0.to_string()).collect())
    }
}

/// Predictor that always fails as if no model were trained.
struct UnavailablePredictor;

impl LabelPredictor for UnavailablePredictor {
    fn predict(&self, _texts: &[String]) -> DomainResult<Vec<String>> {
        Err(DomainError::ModelUnavailable)
    }
}

fn offline_github() -> GitHubClient {
    // Never contacted by these tests.
    GitHubClient::with_base_url("http://127.0.0.1:1", None, 100)
}

fn service(
    repo: Arc<SqliteIssueRepository>,
    predictor: Arc<dyn LabelPredictor>,
) -> TriageService<SqliteIssueRepository> {
    TriageService::new(repo, predictor, offline_github())
}

#[tokio::test]
async fn test_merge_inserts_new_issues_with_defaults_and_tag() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let fetched = vec![make_issue(1, "One"), make_issue(2, "Two")];
    let new_count = svc.merge(fetched, "acme/widget").await.unwrap();
    assert_eq!(new_count, 2);

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.status, IssueStatus::New);
    assert_eq!(stored.priority_score, 0);
    assert!(stored.predicted_label.is_none());
    assert_eq!(stored.repository.as_deref(), Some("acme/widget"));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_merge_is_idempotent() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let fetched = vec![make_issue(1, "One"), make_issue(2, "Two")];
    let first = svc.merge(fetched.clone(), "acme/widget").await.unwrap();
    let after_first = {
        let mut all = repo.get_all().await.unwrap();
        all.sort_by_key(|i| i.id);
        all
    };

    let second = svc.merge(fetched, "acme/widget").await.unwrap();
    let after_second = {
        let mut all = repo.get_all().await.unwrap();
        all.sort_by_key(|i| i.id);
        all
    };

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(after_first, after_second);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_merge_does_not_regress_derived_fields() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let mut triaged = make_issue(1, "Already triaged");
    triaged.status = IssueStatus::Triaged;
    triaged.predicted_label = Some("feature".to_string());
    triaged.priority_score = 77;
    triaged.repository = Some("acme/widget".to_string());
    repo.upsert(&triaged).await.unwrap();

    // The same issue comes back from a fetch with default derived fields.
    let new_count = svc.merge(vec![make_issue(1, "Already triaged")], "acme/widget").await.unwrap();
    assert_eq!(new_count, 0);

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.status, IssueStatus::Triaged);
    assert_eq!(stored.predicted_label.as_deref(), Some("feature"));
    assert_eq!(stored.priority_score, 77);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_merge_backfills_repository_tag_only_if_absent() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    // Issue 1 has no tag, issue 2 is already tagged elsewhere.
    repo.upsert(&make_issue(1, "Untagged")).await.unwrap();
    let mut tagged = make_issue(2, "Tagged");
    tagged.repository = Some("other/repo".to_string());
    repo.upsert(&tagged).await.unwrap();

    svc.merge(
        vec![make_issue(1, "Untagged"), make_issue(2, "Tagged")],
        "acme/widget",
    )
    .await
    .unwrap();

    let one = repo.get(1).await.unwrap().unwrap();
    let two = repo.get(2).await.unwrap().unwrap();
    assert_eq!(one.repository.as_deref(), Some("acme/widget"));
    assert_eq!(two.repository.as_deref(), Some("other/repo"));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_merge_never_removes_absent_issues() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    repo.upsert(&make_issue(1, "Old issue")).await.unwrap();

    // A fetch result that no longer contains issue 1.
    svc.merge(vec![make_issue(2, "New issue")], "acme/widget")
        .await
        .unwrap();

    assert!(repo.get(1).await.unwrap().is_some());
    assert!(repo.get(2).await.unwrap().is_some());

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_triage_classifies_scores_and_marks_everything() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let mut urgent = make_issue(1, "Critical crash");
    urgent.created_at = chrono::Utc::now().to_rfc3339();
    repo.upsert(&urgent).await.unwrap();
    let mut plain = make_issue(2, "Typo in docs");
    plain.created_at = chrono::Utc::now().to_rfc3339();
    repo.upsert(&plain).await.unwrap();

    let processed = svc.triage().await.unwrap();
    assert_eq!(processed, 2);

    let urgent = repo.get(1).await.unwrap().unwrap();
    assert_eq!(urgent.status, IssueStatus::Triaged);
    assert_eq!(urgent.predicted_label.as_deref(), Some("bug"));
    assert_eq!(urgent.priority_score, 90); // critical(50) + crash(40)

    let plain = repo.get(2).await.unwrap().unwrap();
    assert_eq!(plain.status, IssueStatus::Triaged);
    assert_eq!(plain.priority_score, 0);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_triage_aborts_before_writes_when_model_unavailable() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(UnavailablePredictor));

    repo.upsert(&make_issue(1, "Crash")).await.unwrap();

    let result = svc.triage().await;
    assert!(matches!(result, Err(DomainError::ModelUnavailable)));

    // Nothing was written.
    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.status, IssueStatus::New);
    assert!(stored.predicted_label.is_none());
    assert_eq!(stored.priority_score, 0);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_triage_of_empty_store_processes_nothing() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    assert_eq!(svc.triage().await.unwrap(), 0);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_triage_rerun_is_idempotent_for_fresh_issues() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let mut issue = make_issue(1, "Security failure");
    issue.created_at = chrono::Utc::now().to_rfc3339();
    repo.upsert(&issue).await.unwrap();

    svc.triage().await.unwrap();
    let first = repo.get(1).await.unwrap().unwrap();

    svc.triage().await.unwrap();
    let second = repo.get(1).await.unwrap().unwrap();

    assert_eq!(first.predicted_label, second.predicted_label);
    assert_eq!(first.priority_score, second.priority_score);
    assert_eq!(second.status, IssueStatus::Triaged);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_webhook_issue_preserves_derived_fields_for_known_id() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    let mut existing = make_issue(1, "Old title");
    existing.status = IssueStatus::Triaged;
    existing.predicted_label = Some("feature".to_string());
    existing.priority_score = 33;
    existing.repository = Some("acme/widget".to_string());
    repo.upsert(&existing).await.unwrap();

    svc.apply_webhook_issue(make_issue(1, "Edited title"))
        .await
        .unwrap();

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.title, "Edited title");
    assert_eq!(stored.status, IssueStatus::Triaged);
    assert_eq!(stored.predicted_label.as_deref(), Some("feature"));
    assert_eq!(stored.priority_score, 33);
    assert_eq!(stored.repository.as_deref(), Some("acme/widget"));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_webhook_issue_inserts_unknown_id_as_new() {
    let pool = setup_test_db().await;
    let repo = Arc::new(SqliteIssueRepository::new(pool.clone()));
    let svc = service(repo.clone(), Arc::new(FixedPredictor("bug")));

    svc.apply_webhook_issue(make_issue(9, "Fresh from webhook"))
        .await
        .unwrap();

    let stored = repo.get(9).await.unwrap().unwrap();
    assert_eq!(stored.status, IssueStatus::New);
    assert_eq!(stored.priority_score, 0);

    teardown_test_db(pool).await;
}
