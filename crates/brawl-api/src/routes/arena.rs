//! Arena read model.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use brawl_arena::application::arena::ArenaSnapshot;

use crate::state::AppState;

/// GET /
async fn get_arena(State(state): State<AppState>) -> Json<ArenaSnapshot> {
    Json(state.arena.snapshot())
}

/// Returns the router for the arena read model.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_arena))
}
