//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use brawl_arena::application::arena::Arena;
use brawl_broadcast::Broadcaster;
use brawl_core::rng::DeterministicRng;
use brawl_orchestrator::{
    Ingestor, LoopContext, MatchConfig, Supervisor, SupervisorHandle, spawn_ingestion,
};
use brawl_test_support::{FixedClock, MockRng, ScriptedOracle};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use brawl_api::build_router;
use brawl_api::state::AppState;

/// Chat identity allowed to start matches in tests.
pub const ADMIN: &str = "globalworming";

/// A fully wired app plus handles for inspecting it.
pub struct TestApp {
    pub router: Router,
    pub arena: Arena,
    pub broadcaster: Arc<Broadcaster>,
    pub supervisor: SupervisorHandle,
    pub oracle: Arc<ScriptedOracle>,
}

/// Build the full app with a scripted oracle, real supervisor and real
/// ingestion. Rounds are long enough that none completes during a test.
pub fn build_test_app() -> TestApp {
    let broadcaster = Broadcaster::new(Arc::new(FixedClock::default()), Duration::from_secs(1));
    let oracle = Arc::new(ScriptedOracle::default());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    let ctx = LoopContext {
        config: Arc::new(MatchConfig {
            round_duration: Duration::from_secs(3_600),
            summary_interval: Duration::from_secs(3_600),
            ..MatchConfig::default()
        }),
        oracle: oracle.clone(),
        speech: None,
        broadcaster: Arc::clone(&broadcaster),
        rng,
    };

    let arena = Arena::new(3, 200);
    let (supervisor, _task) = Supervisor::spawn(ctx, arena.clone());
    let (chat_tx, chat_rx) = mpsc::unbounded_channel();
    let _ingestion = spawn_ingestion(
        chat_rx,
        Ingestor::new(Arc::clone(arena.inboxes()), supervisor.clone(), ADMIN),
    );

    let state = AppState::new(
        arena.view(),
        Arc::clone(&broadcaster),
        supervisor.clone(),
        chat_tx,
    );

    TestApp {
        router: build_router(state),
        arena,
        broadcaster,
        supervisor,
        oracle,
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Send a POST request with a JSON body and return the status and body.
///
/// An empty body decodes as `Value::Null`.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
