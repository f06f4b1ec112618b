//! GitHub HTTP client.
//!
//! Wraps the GitHub REST API v3 issue-list endpoint with bearer-token
//! auth and pagination. Includes a token-bucket rate limiter to stay
//! within the 5 000 req/hour authenticated API limit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::domain::models::Issue;

use super::models::GitHubIssue;

/// Base URL for the GitHub REST API v3.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets and a token becomes available.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens in the bucket.
    capacity: u32,
    /// Current available tokens.
    tokens: u32,
    /// Duration of the refill window.
    window: Duration,
    /// When the current window started.
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given capacity and window.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Acquire a single token, sleeping if necessary.
    ///
    /// If the current window has elapsed, the bucket is refilled.
    /// If no tokens are available, this method sleeps until the
    /// window resets.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            // Refill the bucket and start a new window.
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            // Sleep until the window resets.
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "GitHub rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            // After sleeping, refill and consume one token.
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// HTTP client for the GitHub issue-list endpoint.
///
/// Fetch failures are best-effort: pagination aborts on the first
/// network or HTTP error and whatever was accumulated so far is
/// returned, logged, never retried.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// The underlying HTTP client.
    http: Client,
    /// Base URL, overridable for tests.
    base_url: String,
    /// GitHub personal access token, if configured.
    token: Option<String>,
    /// Issues requested per page; a short page terminates pagination.
    page_size: usize,
    /// Shared rate limiter (5 000 req/hr for authenticated requests).
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl GitHubClient {
    /// Create a new client with the given token and page size.
    pub fn new(token: Option<String>, page_size: usize) -> Self {
        Self::with_base_url(GITHUB_API_BASE, token, page_size)
    }

    /// Create a client against a custom API base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: Option<String>,
        page_size: usize,
    ) -> Self {
        // GitHub allows 5 000 authenticated requests per hour.
        let rate_limiter = RateLimiter::new(5_000, Duration::from_secs(3_600));
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token,
            page_size: page_size.max(1),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        }
    }

    /// Acquire a rate-limit token and build an authorized request.
    async fn rate_limited_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.rate_limiter.lock().await.acquire().await;
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "issuepilot");
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    /// Fetch all open issues from `repository` ("owner/name").
    ///
    /// Pages through the API until a short page is returned. Items
    /// carrying a `pull_request` ref are dropped, and a missing body
    /// normalizes to the empty string. On error the pages fetched so
    /// far are returned.
    pub async fn fetch_issues(&self, repository: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut page: usize = 1;

        loop {
            let url = format!(
                "{}/repos/{}/issues?state=open&per_page={}&page={}",
                self.base_url, repository, self.page_size, page
            );

            let batch = match self.fetch_page(&url).await {
                Ok(batch) => batch,
                Err(message) => {
                    tracing::warn!(
                        repository,
                        page,
                        accumulated = issues.len(),
                        error = %message,
                        "issue fetch aborted, keeping partial results"
                    );
                    break;
                }
            };

            let batch_len = batch.len();
            issues.extend(
                batch
                    .into_iter()
                    .filter(|item| item.pull_request.is_none())
                    .map(GitHubIssue::into_issue),
            );

            // A short (or empty) page means we have seen everything.
            if batch_len < self.page_size {
                break;
            }
            page += 1;
        }

        issues
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<GitHubIssue>, String> {
        let resp = self
            .rate_limited_request(url)
            .await
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("GitHub returned {status}: {body}"));
        }

        resp.json::<Vec<GitHubIssue>>()
            .await
            .map_err(|e| format!("response parse failed: {e}"))
    }
}
