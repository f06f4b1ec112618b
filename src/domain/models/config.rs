use serde::{Deserialize, Serialize};

/// Main configuration structure for IssuePilot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// GitHub API configuration.
    #[serde(default)]
    pub github: GithubConfig,

    /// Classifier model artifact locations.
    #[serde(default)]
    pub model: ModelConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// API key expected in the `X-API-Key` header on protected routes.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Whether to attach a permissive CORS layer.
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Requests per minute allowed on the sync and triage triggers.
    #[serde(default = "default_trigger_rate_limit")]
    pub trigger_rate_limit_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: default_api_key(),
            enable_cors: default_true(),
            trigger_rate_limit_per_minute: default_trigger_rate_limit(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// GitHub API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GithubConfig {
    /// Personal access token for the GitHub REST API.
    #[serde(default)]
    pub token: Option<String>,

    /// Default repository to sync ("owner/name") when a request does
    /// not name one.
    #[serde(default)]
    pub repository: Option<String>,

    /// Secret used to verify webhook signatures.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Issues fetched per page; a short page terminates pagination.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            webhook_secret: None,
            page_size: default_page_size(),
        }
    }
}

/// Classifier model artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Path to the persisted vectorizer state.
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: String,

    /// Path to the persisted classifier state.
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: default_vectorizer_path(),
            model_path: default_model_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_api_key() -> String {
    // Dev convenience only; override in any real deployment.
    "dev-secret-key".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_trigger_rate_limit() -> u32 {
    5
}

fn default_database_path() -> String {
    "issuepilot.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_page_size() -> usize {
    100
}

fn default_vectorizer_path() -> String {
    "model_artifacts/vectorizer.json".to_string()
}

fn default_model_path() -> String {
    "model_artifacts/model.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
