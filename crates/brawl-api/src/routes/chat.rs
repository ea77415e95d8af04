//! Chat bridge: accepts chat lines from the external chat source.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use brawl_core::error::DomainError;
use brawl_orchestrator::ChatMessage;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Stable submitter identity.
    pub identity: String,
    /// Raw chat text.
    pub text: String,
}

/// POST /
#[instrument(skip(state, request), fields(identity = %request.identity))]
async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<StatusCode, ApiError> {
    if request.identity.trim().is_empty() {
        return Err(DomainError::Validation("identity must not be empty".to_owned()).into());
    }

    state
        .chat
        .send(ChatMessage {
            identity: request.identity,
            text: request.text,
        })
        .map_err(|_| DomainError::Infrastructure("chat ingestion has stopped".to_owned()))?;

    debug!("chat line queued");
    Ok(StatusCode::ACCEPTED)
}

/// Returns the router for the chat bridge.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(post_chat))
}
