//! Server-sent display event stream.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::{Router, routing::get};
use brawl_core::event::EventEnvelope;
use futures::{Stream, StreamExt};
use tracing::{info, instrument};

use crate::state::AppState;

/// Maps an envelope onto an SSE frame: the event kind as the SSE event
/// name, the envelope id as the SSE id, and the payload as JSON data.
fn to_sse(envelope: &EventEnvelope) -> Event {
    Event::default()
        .event(envelope.event.kind())
        .id(envelope.event_id.to_string())
        .data(envelope.event.payload().to_string())
}

/// GET /events
///
/// Registers a consumer for the lifetime of the connection. Keepalive pings
/// come from the broadcaster itself, so no transport-level keepalive is set.
#[instrument(skip(state))]
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.broadcaster.subscribe();
    info!(
        consumers = state.broadcaster.subscriber_count(),
        "display consumer connected"
    );
    Sse::new(
        subscription
            .into_stream()
            .map(|envelope| Ok(to_sse(&envelope))),
    )
}

/// Returns the event stream router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(stream_events))
}
