//! REST API surface.
//!
//! Exposes the triage pipeline over HTTP: sync and triage triggers,
//! issue listing and statistics, manual label correction, CSV export,
//! and the GitHub webhook receiver.

pub mod auth;
pub mod handlers;
pub mod rate_limit;
pub mod webhook;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::{GithubConfig, ServerConfig};
use crate::domain::ports::IssueRepository;
use crate::services::{IssueService, TriageService};

use rate_limit::TriggerLimiter;

/// Shared state for the API.
pub struct AppState<R: IssueRepository> {
    pub triage: Arc<TriageService<R>>,
    pub issues: IssueService<R>,
    pub api_key: String,
    pub github: GithubConfig,
    pub sync_limiter: TriggerLimiter,
    pub triage_limiter: TriggerLimiter,
}

/// The API server.
pub struct ApiServer<R: IssueRepository + 'static> {
    config: ServerConfig,
    state: Arc<AppState<R>>,
}

impl<R: IssueRepository + 'static> ApiServer<R> {
    pub fn new(
        config: ServerConfig,
        github: GithubConfig,
        triage: Arc<TriageService<R>>,
        issues: IssueService<R>,
    ) -> Self {
        let state = Arc::new(AppState {
            triage,
            issues,
            api_key: config.api_key.clone(),
            github,
            sync_limiter: TriggerLimiter::per_minute(config.trigger_rate_limit_per_minute),
            triage_limiter: TriggerLimiter::per_minute(config.trigger_rate_limit_per_minute),
        });
        Self { config, state }
    }

    /// Build the router.
    pub fn build_router(&self) -> Router {
        let app = Router::new()
            // Sync/triage triggers
            .route("/sync", post(handlers::trigger_sync::<R>))
            .route("/triage", post(handlers::trigger_triage::<R>))
            // Issue queries
            .route("/issues", get(handlers::list_issues::<R>))
            .route("/issues/{id}", patch(handlers::update_label::<R>))
            .route("/stats", get(handlers::get_stats::<R>))
            .route("/export", get(handlers::export_issues::<R>))
            // GitHub webhook
            .route("/webhook", post(webhook::github_webhook::<R>))
            // Health check
            .route("/health", get(handlers::health_check))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server, stopping gracefully when `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("IssuePilot API listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;
        Ok(())
    }
}
