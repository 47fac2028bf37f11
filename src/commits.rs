//! Commit metadata lookups against the source-control API

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::GitHubConfig;
use crate::error::{GlueError, Result};
use crate::event::BuildEvent;

/// Commit details used to enrich a deploy notification
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub sha: String,
    pub author: String,
    pub author_avatar_url: Option<String>,
    pub message: String,
    pub html_url: Option<String>,
}

impl CommitInfo {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Look up a commit in `repo` (`owner/name`). `Ok(None)` when it does not exist.
    async fn lookup(&self, repo: &str, sha: &str) -> Result<Option<CommitInfo>>;
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: Option<String>,
    commit: CommitBody,
    author: Option<AccountRef>,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    message: String,
    author: Option<GitSignature>,
}

#[derive(Debug, Deserialize)]
struct GitSignature {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccountRef {
    login: String,
    avatar_url: Option<String>,
}

impl From<CommitResponse> for CommitInfo {
    fn from(response: CommitResponse) -> Self {
        // Prefer the git author name; fall back to the linked account login.
        let author = response
            .commit
            .author
            .map(|a| a.name)
            .or_else(|| response.author.as_ref().map(|a| a.login.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        CommitInfo {
            sha: response.sha,
            author,
            author_avatar_url: response.author.and_then(|a| a.avatar_url),
            message: response.commit.message,
            html_url: response.html_url,
        }
    }
}

/// GitHub REST commits endpoint
#[derive(Clone)]
pub struct GitHubCommits {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubCommits {
    pub fn new(client: reqwest::Client, config: GitHubConfig) -> Self {
        Self { client, config }
    }
}

/// Resolves `owner/name` for a build: explicit repository first, then owner + REPO_NAME.
pub fn resolve_repository(config: &GitHubConfig, event: &BuildEvent) -> Option<String> {
    if let Some(repo) = &config.repository {
        return Some(repo.clone());
    }
    match (&config.owner, event.repo_name()) {
        (Some(owner), Some(name)) => Some(format!("{}/{}", owner, name)),
        _ => None,
    }
}

#[async_trait]
impl CommitSource for GitHubCommits {
    async fn lookup(&self, repo: &str, sha: &str) -> Result<Option<CommitInfo>> {
        let url = format!("{}/repos/{}/commits/{}", self.config.api_url, repo, sha);
        debug!("Fetching commit {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("cicd_glue/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GlueError::SourceControl {
                status: status.as_u16(),
                message,
            });
        }

        let body: CommitResponse = response.json().await?;
        Ok(Some(body.into()))
    }
}
