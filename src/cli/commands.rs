//! CLI command implementations.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::adapters::github::GitHubClient;
use crate::adapters::sqlite::{
    all_migrations, create_pool, Migrator, PoolConfig, SqliteIssueRepository,
};
use crate::api::ApiServer;
use crate::domain::models::Config;
use crate::services::{IssueClassifier, IssueService, TrainingExample, TriageService};

use super::{SyncArgs, TrainArgs};

/// Wired-up application services.
struct App {
    triage: Arc<TriageService<SqliteIssueRepository>>,
    issues: IssueService<SqliteIssueRepository>,
    classifier: Arc<IssueClassifier>,
}

/// Open the database, apply migrations, and wire the services.
///
/// The classifier artifacts are loaded best-effort: a missing model
/// leaves prediction unavailable (triage fails cleanly) but the rest of
/// the system runs.
async fn bootstrap(config: &Config) -> Result<App> {
    let database_url = if config.database.path.starts_with("sqlite:") {
        config.database.path.clone()
    } else {
        format!("sqlite:{}", config.database.path)
    };
    let pool = create_pool(
        &database_url,
        Some(PoolConfig {
            max_connections: config.database.max_connections,
            ..PoolConfig::default()
        }),
    )
    .await
    .context("failed to open database")?;

    let applied = Migrator::new(pool.clone())
        .run_embedded_migrations(all_migrations())
        .await
        .context("failed to run migrations")?;
    if applied > 0 {
        tracing::info!(applied, "applied database migrations");
    }

    let repository = Arc::new(SqliteIssueRepository::new(pool));

    let classifier = Arc::new(IssueClassifier::new(
        &config.model.vectorizer_path,
        &config.model.model_path,
    ));
    match classifier.load() {
        Ok(()) => tracing::info!("classifier model loaded"),
        Err(err) => tracing::warn!(error = %err, "classifier model not loaded, train it first"),
    }

    let github = GitHubClient::new(config.github.token.clone(), config.github.page_size);

    let triage = Arc::new(TriageService::new(
        repository.clone(),
        classifier.clone(),
        github,
    ));
    let issues = IssueService::new(repository);

    Ok(App {
        triage,
        issues,
        classifier,
    })
}

/// `issuepilot serve` — run the HTTP API until interrupted.
pub async fn serve(config: Config) -> Result<()> {
    let app = bootstrap(&config).await?;

    let server = ApiServer::new(
        config.server.clone(),
        config.github.clone(),
        app.triage,
        app.issues,
    );

    server
        .serve(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}

/// `issuepilot train` — fit the classifier and persist its artifacts.
pub async fn train(config: Config, args: TrainArgs) -> Result<()> {
    let raw = std::fs::read(&args.data)
        .with_context(|| format!("failed to read corpus {}", args.data.display()))?;
    let corpus: Vec<TrainingExample> =
        serde_json::from_slice(&raw).context("corpus must be a JSON array of {text, label}")?;

    let classifier = IssueClassifier::new(&config.model.vectorizer_path, &config.model.model_path);
    classifier.train(&corpus)?;

    tracing::info!(
        examples = corpus.len(),
        vectorizer = %config.model.vectorizer_path,
        model = %config.model.model_path,
        "model trained and saved"
    );
    Ok(())
}

/// `issuepilot sync` — one-shot fetch and merge.
pub async fn sync(config: Config, args: SyncArgs) -> Result<()> {
    let Some(repository) = args.repo.or_else(|| config.github.repository.clone()) else {
        bail!("no repository given and none configured");
    };

    let app = bootstrap(&config).await?;
    let summary = app.triage.sync(&repository).await?;
    tracing::info!(
        repository,
        fetched = summary.fetched,
        new = summary.new_count,
        "sync finished"
    );
    Ok(())
}

/// `issuepilot triage` — one-shot triage pass.
pub async fn triage(config: Config) -> Result<()> {
    let app = bootstrap(&config).await?;
    if !app.classifier.is_loaded() {
        bail!("classifier model unavailable: run `issuepilot train` first");
    }

    let processed = app.triage.triage().await?;
    tracing::info!(processed, "triage finished");
    Ok(())
}
