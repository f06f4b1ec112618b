//! Domain models.

pub mod config;
pub mod issue;

pub use config::{
    Config, DatabaseConfig, GithubConfig, LoggingConfig, ModelConfig, ServerConfig,
};
pub use issue::{Issue, IssueStatus};
