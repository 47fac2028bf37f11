//! Pub/Sub push endpoint for build status events

use axum::{body::Bytes, extract::State as AxumState, http::StatusCode};
use tracing::{debug, error};

use crate::SharedState;
use crate::event::decode_push_envelope;
use crate::notifier::{NotifierContext, handle_build_event};

/// POST / - Handles one pushed build event.
///
/// Always answers 204 so the subscription never redelivers, including for
/// payloads that do not decode; those are logged and dropped.
pub async fn handle_push(AxumState(state): AxumState<SharedState>, body: Bytes) -> StatusCode {
    let event = match decode_push_envelope(&body) {
        Ok(event) => event,
        Err(e) => {
            error!("Could not decode pushed build event, dropping it: {}", e);
            return StatusCode::NO_CONTENT;
        }
    };
    debug!("{:#?}", &event);

    let ctx = NotifierContext {
        config: &state.config,
        client: &state.client,
        commits: state.commits.as_ref(),
    };
    let outcome = handle_build_event(&ctx, &event).await;
    debug!("Build {} outcome: {:?}", event.id, outcome);

    StatusCode::NO_CONTENT
}
