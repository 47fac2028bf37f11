pub mod api;
pub mod commits;
pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod exporter;
pub mod logging;
pub mod message;
pub mod notifier;
pub mod utils;
pub mod webhook;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use commits::{CommitSource, GitHubCommits};
use config::NotifierConfig;

/// Shared, read-only state of the notifier server
pub struct AppState {
    pub config: NotifierConfig,
    pub client: reqwest::Client,
    pub commits: Arc<dyn CommitSource>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State backed by the GitHub commits API from `config.github`.
    pub fn new(config: NotifierConfig, client: reqwest::Client) -> Self {
        let commits = Arc::new(GitHubCommits::new(client.clone(), config.github.clone()));
        Self::with_commit_source(config, client, commits)
    }

    pub fn with_commit_source(
        config: NotifierConfig,
        client: reqwest::Client,
        commits: Arc<dyn CommitSource>,
    ) -> Self {
        Self {
            config,
            client,
            commits,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;
