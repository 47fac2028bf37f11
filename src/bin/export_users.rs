//! Prints CREATE USER and GRANT statements for every non-root, non-local
//! MySQL account to stdout.

use cicd_glue::config::ExporterConfig;
use cicd_glue::db::{self, MySqlAccounts};
use cicd_glue::error::Result;
use cicd_glue::exporter::export_script;
use cicd_glue::logging::{file_logger_from_env, setup_logging};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let file_logger = file_logger_from_env("export_users");
    let _log_guard = setup_logging(file_logger.as_ref())?;

    let config = ExporterConfig::from_env(|key| std::env::var(key).ok())?;
    let pool = db::connect(&config).await?;
    let script = export_script(&MySqlAccounts::new(pool.clone())).await?;
    pool.close().await;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(script.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
