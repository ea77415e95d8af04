//! Match control.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use brawl_core::error::DomainError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct NewMatchRequest {
    /// Side 1 fighter name.
    pub p1: String,
    /// Side 2 fighter name.
    pub p2: String,
}

/// Response body for a started match.
#[derive(Debug, Serialize)]
pub struct NewMatchResponse {
    /// Generation of the new match.
    pub generation: u64,
}

/// POST /
#[instrument(skip(state, request), fields(p1 = %request.p1, p2 = %request.p2))]
async fn new_match(
    State(state): State<AppState>,
    Json(request): Json<NewMatchRequest>,
) -> Result<(StatusCode, Json<NewMatchResponse>), ApiError> {
    let p1 = request.p1.trim();
    let p2 = request.p2.trim();
    if p1.is_empty() || p2.is_empty() {
        return Err(DomainError::Validation("both fighter names are required".to_owned()).into());
    }

    let generation = state.supervisor.start_match(p1, p2).await?;
    info!(generation, "match started over http");

    Ok((StatusCode::ACCEPTED, Json(NewMatchResponse { generation })))
}

/// Returns the router for match control.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(new_match))
}
