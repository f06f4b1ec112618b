//! Shared test helpers.

pub mod database;

use issuepilot::domain::models::{Issue, IssueStatus};

/// Build an issue with sane defaults for tests.
pub fn make_issue(id: i64, title: &str) -> Issue {
    Issue {
        id,
        number: id,
        title: title.to_string(),
        body: String::new(),
        state: "open".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        html_url: format!("https://github.com/acme/widget/issues/{id}"),
        repository: None,
        status: IssueStatus::New,
        predicted_label: None,
        priority_score: 0,
        manual_correction: false,
    }
}
