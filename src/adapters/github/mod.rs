//! GitHub adapter: HTTP client and wire models.

pub mod client;
pub mod models;

pub use client::GitHubClient;
pub use models::{GitHubIssue, WebhookPayload};
