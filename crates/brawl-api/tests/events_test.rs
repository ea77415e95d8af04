//! Integration tests for the server-sent event stream.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brawl_core::event::{DisplayEvent, Side};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Reads body frames until `needle` shows up in the accumulated text.
async fn read_until(body: &mut Body, needle: &str) -> String {
    let mut text = String::new();
    while !text.contains(needle) {
        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), body.frame())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            text.push_str(&String::from_utf8_lossy(&data));
        }
    }
    text
}

#[tokio::test]
async fn test_events_stream_sends_kind_name_and_json_payload() {
    // Arrange
    let app = common::build_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/events")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut body = response.into_body();

    // Act
    app.broadcaster.publish(DisplayEvent::Think {
        side: Side::P2,
        text: "a toothy dragon worm".to_owned(),
    });
    let text = read_until(&mut body, "dragon").await;

    // Assert
    assert!(text.contains("event: think"));
    assert!(text.contains("id: "));
    assert!(text.contains(r#"data: {"side":"p2","text":"a toothy dragon worm"}"#));
}

#[tokio::test]
async fn test_match_start_is_streamed_as_state_event() {
    // Arrange
    let app = common::build_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/events")
        .body(Body::empty())
        .unwrap();
    let mut body = app.router.oneshot(request).await.unwrap().into_body();

    // Act
    app.supervisor.start_match("Boggy", "Slimy").await.unwrap();
    let text = read_until(&mut body, "round-start").await;

    // Assert
    assert!(text.contains("event: state"));
    assert!(text.contains(r#""name":"Boggy""#));
    assert!(text.contains("what next..."));
}

#[tokio::test]
async fn test_disconnected_stream_deregisters_consumer() {
    let app = common::build_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/events")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(app.broadcaster.subscriber_count(), 1);

    drop(response);

    assert_eq!(app.broadcaster.subscriber_count(), 0);
}
