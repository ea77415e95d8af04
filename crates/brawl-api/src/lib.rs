//! Brawl — HTTP surface, configuration, and process wiring.

pub mod config;
pub mod error;
pub mod relay;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::events::router())
        .nest("/api/v1/chat", routes::chat::router())
        .nest("/api/v1/match", routes::matches::router())
        .nest("/api/v1/arena", routes::arena::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
