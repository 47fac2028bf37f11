use std::io;

/// Error type shared by the build notifier and the user exporter
#[derive(Debug, thiserror::Error)]
pub enum GlueError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid event payload: {0}")]
    PayloadError(String),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source control lookup failed ({status}): {message}")]
    SourceControl { status: u16, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

/// Helper type for Results that use GlueError
pub type Result<T> = std::result::Result<T, GlueError>;
