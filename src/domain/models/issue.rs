//! Issue domain model.
//!
//! Issues are mirrored from the external tracker and enriched locally
//! with triage fields. Mirrored fields are overwritten on sync; derived
//! fields belong to the triage pipeline and update independently.

use serde::{Deserialize, Serialize};

/// Triage status of a stored issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Stored but not yet classified or scored.
    #[default]
    New,
    /// At least one triage pass has run over this issue.
    Triaged,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Triaged => "triaged",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(Self::New),
            "triaged" => Some(Self::Triaged),
            _ => None,
        }
    }
}

/// An issue record: mirrored source fields plus locally derived
/// triage fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// External unique identifier (GitHub issue id). Immutable.
    pub id: i64,
    /// Sequential number within the repository.
    pub number: i64,
    pub title: String,
    /// Issue body; a missing body normalizes to the empty string.
    #[serde(default)]
    pub body: String,
    /// Source state: "open" or "closed".
    pub state: String,
    /// Creation timestamp as reported by the source (ISO 8601 string).
    /// Parsed leniently by the scorer; never interpreted elsewhere.
    pub created_at: String,
    pub html_url: String,
    /// Origin repository tag ("owner/name"). Set once, never cleared.
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub predicted_label: Option<String>,
    #[serde(default)]
    pub priority_score: i64,
    /// Set when a human has overridden the predicted label.
    #[serde(default)]
    pub manual_correction: bool,
}

impl Issue {
    /// The text a triage pass classifies and scores.
    pub fn triage_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [IssueStatus::New, IssueStatus::Triaged] {
            assert_eq!(IssueStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(IssueStatus::from_str("bogus"), None);
    }

    #[test]
    fn triage_text_joins_title_and_body() {
        let issue = Issue {
            id: 1,
            number: 1,
            title: "Crash on start".to_string(),
            body: "stack trace attached".to_string(),
            state: "open".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            html_url: String::new(),
            repository: None,
            status: IssueStatus::New,
            predicted_label: None,
            priority_score: 0,
            manual_correction: false,
        };
        assert_eq!(issue.triage_text(), "Crash on start stack trace attached");
    }
}
