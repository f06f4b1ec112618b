//! Priority scoring for issues.
//!
//! Pure keyword + age scoring: deterministic for a fixed evaluation
//! instant, monotonically non-decreasing as an issue ages, and
//! infallible (malformed timestamps contribute zero age).

use chrono::{DateTime, Utc};

use crate::domain::models::Issue;

/// Keyword weight table. Each keyword contributes its weight on a plain
/// substring match against the lower-cased title + body; weights
/// accumulate independently, with no overlap suppression and no word
/// boundary check.
const PRIORITY_KEYWORDS: [(&str, i64); 7] = [
    ("critical", 50),
    ("crash", 40),
    ("security", 50),
    ("urgent", 30),
    ("bug", 20),
    ("error", 20),
    ("failure", 30),
];

/// Service for calculating issue priority scores.
#[derive(Debug, Clone, Default)]
pub struct PriorityScorer;

impl PriorityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score an issue as of now.
    pub fn score(&self, issue: &Issue) -> i64 {
        self.score_at(issue, Utc::now())
    }

    /// Score an issue as of a fixed evaluation instant.
    ///
    /// Keyword weights plus one point per full day elapsed since
    /// `created_at`. Unparsable or future timestamps contribute 0.
    pub fn score_at(&self, issue: &Issue, now: DateTime<Utc>) -> i64 {
        let text = issue.triage_text().to_lowercase();

        let mut score = 0;
        for (keyword, points) in PRIORITY_KEYWORDS {
            if text.contains(keyword) {
                score += points;
            }
        }

        score + Self::age_days(&issue.created_at, now)
    }

    fn age_days(created_at: &str, now: DateTime<Utc>) -> i64 {
        let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
            return 0;
        };
        let days = (now - created.with_timezone(&Utc)).num_days();
        days.max(0)
    }
}
