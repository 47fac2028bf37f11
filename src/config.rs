//! Configuration for both binaries.
//!
//! The notifier reads an optional TOML file and then lets environment
//! variables override individual keys. The exporter is configured from the
//! environment only.

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;
use std::fs;
use std::path::Path;

use crate::error::{GlueError, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_DEPLOY_KEYWORD: &str = "deploy";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 3306;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    pub bind_address: String,
    pub deploy_keyword: String,
    pub failure_mention: Option<String>,
    pub github: GitHubConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub token: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            deploy_keyword: DEFAULT_DEPLOY_KEYWORD.to_string(),
            failure_mention: None,
            github: GitHubConfig::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            owner: None,
            repository: None,
            token: None,
        }
    }
}

impl NotifierConfig {
    /// Load the config file if it exists, otherwise start from defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path).map_err(|e| {
            GlueError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_str)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let mut config: NotifierConfig = toml::from_str(source)?;
        config.normalize();
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a map.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DISCORD_WEBHOOK_URL") {
            self.webhook_url = Some(url);
        }
        if let Some(addr) = get("BIND_ADDRESS") {
            self.bind_address = addr;
        } else if let Some(port) = get("PORT") {
            self.bind_address = format!("0.0.0.0:{}", port);
        }
        if let Some(keyword) = get("DEPLOY_KEYWORD") {
            self.deploy_keyword = keyword;
        }
        if let Some(mention) = get("FAILURE_MENTION") {
            self.failure_mention = Some(mention);
        }
        if let Some(api_url) = get("GITHUB_API_URL") {
            self.github.api_url = api_url;
        }
        if let Some(owner) = get("GITHUB_OWNER") {
            self.github.owner = Some(owner);
        }
        if let Some(repository) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(repository);
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }

        self.normalize();
        self
    }

    /// Returns the webhook URL when one is configured and non-empty.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    // Empty strings in the file are treated as unset.
    fn normalize(&mut self) {
        fn clear_blank(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        clear_blank(&mut self.webhook_url);
        clear_blank(&mut self.failure_mention);
        clear_blank(&mut self.github.owner);
        clear_blank(&mut self.github.repository);
        clear_blank(&mut self.github.token);
        self.github.api_url = self.github.api_url.trim_end_matches('/').to_string();
        if self.deploy_keyword.trim().is_empty() {
            self.deploy_keyword = DEFAULT_DEPLOY_KEYWORD.to_string();
        }
    }
}

/// Database credentials for the user exporter
#[derive(Debug, Clone, PartialEq)]
pub enum ExporterConfig {
    Url(String),
    Credentials {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
    },
}

impl ExporterConfig {
    pub fn from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get("DATABASE_URL") {
            return Ok(ExporterConfig::Url(url));
        }

        let user = get("DB_USER").ok_or_else(|| {
            GlueError::ConfigError("DB_USER or DATABASE_URL must be set".to_string())
        })?;
        let port = match get("DB_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                GlueError::ConfigError(format!("Invalid DB_PORT '{}': {}", raw, e))
            })?,
            None => DEFAULT_DB_PORT,
        };

        Ok(ExporterConfig::Credentials {
            host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port,
            user,
            password: get("DB_PASSWORD"),
        })
    }

    pub fn connect_options(&self) -> Result<MySqlConnectOptions> {
        match self {
            ExporterConfig::Url(url) => url
                .parse::<MySqlConnectOptions>()
                .map_err(|e| GlueError::ConfigError(format!("Invalid DATABASE_URL: {}", e))),
            ExporterConfig::Credentials {
                host,
                port,
                user,
                password,
            } => {
                let mut options = MySqlConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user);
                if let Some(password) = password {
                    options = options.password(password);
                }
                Ok(options)
            }
        }
    }
}
