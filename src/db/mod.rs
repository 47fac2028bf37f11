use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

pub mod accounts;

use crate::config::ExporterConfig;
use crate::error::Result;
pub use accounts::{Account, AccountSource, MySqlAccounts};

/// Open a single-connection MySQL pool for the exporter
pub async fn connect(config: &ExporterConfig) -> Result<MySqlPool> {
    let options = config.connect_options()?;
    match config {
        ExporterConfig::Url(_) => info!("Connecting to database from DATABASE_URL"),
        ExporterConfig::Credentials { host, port, user, .. } => {
            info!("Connecting to database at {}:{} as {}", host, port, user)
        }
    }

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
