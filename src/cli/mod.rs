//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Automated GitHub issue triage: sync, classify, score, and serve
/// results over REST.
#[derive(Debug, Parser)]
#[command(name = "issuepilot", version, about)]
pub struct Cli {
    /// Path to a config file (defaults to issuepilot.yaml + env).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API server.
    Serve,

    /// Train the classifier from a labeled corpus and persist the
    /// model artifacts. Offline/administrative operation.
    Train(TrainArgs),

    /// Fetch and merge issues from a repository once, then exit.
    Sync(SyncArgs),

    /// Run a single triage pass over the stored issues, then exit.
    Triage,
}

#[derive(Debug, clap::Args)]
pub struct TrainArgs {
    /// JSON file containing an array of {"text", "label"} examples.
    #[arg(long)]
    pub data: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct SyncArgs {
    /// Repository to sync ("owner/name"); defaults to the configured
    /// repository.
    #[arg(long)]
    pub repo: Option<String>,
}
