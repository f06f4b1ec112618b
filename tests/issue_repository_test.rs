mod helpers;

use issuepilot::adapters::sqlite::SqliteIssueRepository;
use issuepilot::domain::models::IssueStatus;
use issuepilot::domain::ports::IssueRepository;

use helpers::database::{setup_test_db, teardown_test_db};
use helpers::make_issue;

#[tokio::test]
async fn test_upsert_and_get_issue() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let issue = make_issue(101, "Crash on startup");
    repo.upsert(&issue).await.expect("failed to upsert issue");

    let retrieved = repo.get(101).await.expect("failed to get issue");
    assert_eq!(retrieved, Some(issue));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_get_nonexistent_issue() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let result = repo.get(999).await.expect("failed to query");
    assert!(result.is_none());

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_upsert_overwrites_mirrored_and_derived_fields() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let mut issue = make_issue(1, "Original title");
    repo.upsert(&issue).await.unwrap();

    issue.title = "Edited title".to_string();
    issue.state = "closed".to_string();
    issue.status = IssueStatus::Triaged;
    issue.predicted_label = Some("bug".to_string());
    issue.priority_score = 42;
    repo.upsert(&issue).await.unwrap();

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.title, "Edited title");
    assert_eq!(stored.state, "closed");
    assert_eq!(stored.status, IssueStatus::Triaged);
    assert_eq!(stored.predicted_label.as_deref(), Some("bug"));
    assert_eq!(stored.priority_score, 42);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_repository_tag_is_never_cleared() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let mut issue = make_issue(1, "Tagged");
    issue.repository = Some("acme/widget".to_string());
    repo.upsert(&issue).await.unwrap();

    // An input without a tag leaves the stored tag untouched.
    issue.repository = None;
    issue.title = "Tagged, updated".to_string();
    repo.upsert(&issue).await.unwrap();

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.repository.as_deref(), Some("acme/widget"));
    assert_eq!(stored.title, "Tagged, updated");

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_repository_tag_backfills_when_absent() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    repo.upsert(&make_issue(1, "Untagged")).await.unwrap();

    let mut issue = make_issue(1, "Untagged");
    issue.repository = Some("acme/widget".to_string());
    repo.upsert(&issue).await.unwrap();

    let stored = repo.get(1).await.unwrap().unwrap();
    assert_eq!(stored.repository.as_deref(), Some("acme/widget"));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_upsert_many_and_get_all() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let batch = vec![
        make_issue(1, "First"),
        make_issue(2, "Second"),
        make_issue(3, "Third"),
    ];
    repo.upsert_many(&batch).await.unwrap();

    let mut all = repo.get_all().await.unwrap();
    all.sort_by_key(|i| i.id);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "First");
    assert_eq!(all[2].title, "Third");

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_counts_group_by_status_and_label() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let mut triaged = make_issue(1, "Triaged bug");
    triaged.status = IssueStatus::Triaged;
    triaged.predicted_label = Some("bug".to_string());
    repo.upsert(&triaged).await.unwrap();
    repo.upsert(&make_issue(2, "Fresh one")).await.unwrap();
    repo.upsert(&make_issue(3, "Fresh two")).await.unwrap();

    let by_status = repo.count_by_status().await.unwrap();
    assert_eq!(by_status.get("triaged"), Some(&1));
    assert_eq!(by_status.get("new"), Some(&2));

    let by_label = repo.count_by_label().await.unwrap();
    assert_eq!(by_label.get("bug"), Some(&1));
    assert_eq!(by_label.get("unlabeled"), Some(&2));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_manual_correction_flag_round_trips() {
    let pool = setup_test_db().await;
    let repo = SqliteIssueRepository::new(pool.clone());

    let mut issue = make_issue(5, "Mislabeled");
    issue.manual_correction = true;
    repo.upsert(&issue).await.unwrap();

    let stored = repo.get(5).await.unwrap().unwrap();
    assert!(stored.manual_correction);

    teardown_test_db(pool).await;
}
