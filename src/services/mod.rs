//! Services: classification, scoring, and sync/triage orchestration.

pub mod classifier;
pub mod issue_service;
pub mod scorer;
pub mod triage_service;

pub use classifier::{IssueClassifier, TrainingExample};
pub use issue_service::{IssuePage, IssueService, IssueStats, ListFilters};
pub use scorer::PriorityScorer;
pub use triage_service::{SyncSummary, TriageService};
