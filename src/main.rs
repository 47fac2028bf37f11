use cicd_glue::config::NotifierConfig;
use cicd_glue::error::GlueError;
use cicd_glue::logging::{file_logger_from_env, setup_logging};
use cicd_glue::{AppState, api};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "notifier.toml";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn load_config(path: &str) -> Result<NotifierConfig, GlueError> {
    let config = NotifierConfig::load(path)?.with_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let file_logger = file_logger_from_env("build_notifier");
    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {}", e);
            std::process::exit(1);
        }
    };

    let config_path =
        std::env::var("NOTIFIER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let client = match reqwest::Client::builder().timeout(HTTP_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    if config.webhook_url().is_none() {
        info!("No webhook configured; events will be acknowledged and dropped");
    }

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config, client));
    let app = api::build_router(state);

    info!("Listening on {}", bind_address);
    info!("Using config at {:?}", config_path);
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
