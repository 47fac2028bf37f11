//! HTTP surface of the build notifier

pub mod health;
pub mod pubsub;

use axum::{Router, routing};

use crate::SharedState;
pub use health::healthz;
pub use pubsub::handle_push;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::post(handle_push))
        .route("/healthz", routing::get(healthz))
        .with_state(state)
}
