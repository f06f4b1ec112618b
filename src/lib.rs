//! IssuePilot - Automated GitHub Issue Triage
//!
//! IssuePilot ingests issues from GitHub, classifies them with a
//! TF-IDF + naive Bayes model, scores them by keyword and age, and
//! serves the results over a REST API.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Adapters** (`adapters`): GitHub HTTP client, SQLite repository
//! - **Service Layer** (`services`): scoring, classification, and the
//!   sync/triage orchestrator
//! - **API Layer** (`api`): axum routes, auth, webhook receiver
//! - **Infrastructure** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod api;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, Issue, IssueStatus};
pub use domain::ports::{IssueRepository, LabelPredictor};
pub use infrastructure::{ConfigError, ConfigLoader};
pub use services::{IssueClassifier, IssueService, PriorityScorer, TriageService};
