//! Integration tests for `GET /datasources/{id}/events`.

use axum::{
    body::{Body, BodyDataStream},
    http::{header, Request, StatusCode},
};
use futures_util::StreamExt;
use sourcefeed_db::{create_pool, run_migrations, sources, DbPool, DbRuntimeSettings};
use sourcefeed_server::{app, AppState};
use sourcefeed_types::{Event, Source};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tower::ServiceExt; // for oneshot

fn make_pool() -> DbPool {
    let pool = create_pool(
        ":memory:",
        DbRuntimeSettings {
            pool_max_size: 1,
            ..DbRuntimeSettings::default()
        },
    )
    .unwrap();
    let conn = pool.get().unwrap();
    run_migrations(&conn).unwrap();
    sources::save(&conn, &Source::new("a", "Pressure")).unwrap();
    drop(conn);
    pool
}

fn events_request(id: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/datasources/{id}/events"))
        .body(Body::empty())
        .unwrap()
}

/// Reads SSE frames off `body` until `count` data events have arrived.
async fn read_events(body: &mut BodyDataStream, count: usize) -> Vec<Event> {
    let mut buffer = String::new();
    let mut events = Vec::new();

    while events.len() < count {
        let chunk = body
            .next()
            .await
            .expect("stream ended early")
            .expect("body error");
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());

        while let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            for line in frame.lines() {
                if let Some(data) = line.strip_prefix("data:") {
                    events.push(serde_json::from_str(data.trim()).unwrap());
                }
            }
        }
    }
    events
}

#[tokio::test(start_paused = true)]
async fn stream_emits_one_sse_event_per_second() {
    let state = AppState::new(make_pool(), Duration::from_secs(1), Duration::from_secs(15));
    let live = state.service.live_streams().clone();

    let response = app(state).oneshot(events_request("a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(live.current(), 1);

    let started = Instant::now();
    let mut body = response.into_body().into_data_stream();
    let events = read_events(&mut body, 3).await;
    assert_eq!(Instant::now() - started, Duration::from_secs(3));

    for event in &events {
        assert_eq!(event.source, Source::new("a", "Pressure"));
    }
    for pair in events.windows(2) {
        assert_eq!((pair[1].when - pair[0].when).num_milliseconds(), 1_000);
    }

    drop(body);
    assert_eq!(live.current(), 0, "dropping the body releases the timer");
}

#[tokio::test(start_paused = true)]
async fn unknown_id_is_404_and_opens_no_stream() {
    let state = AppState::new(make_pool(), Duration::from_secs(1), Duration::from_secs(15));
    let live = state.service.live_streams().clone();

    let response = app(state).oneshot(events_request("z")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(live.current(), 0);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test(start_paused = true)]
async fn concurrent_subscribers_get_independent_streams() {
    let state = AppState::new(make_pool(), Duration::from_secs(1), Duration::from_secs(15));
    let live = state.service.live_streams().clone();
    let router = app(state);

    let first = router.clone().oneshot(events_request("a")).await.unwrap();
    let second = router.oneshot(events_request("a")).await.unwrap();
    assert_eq!(live.current(), 2);

    let mut first = first.into_body().into_data_stream();
    let mut second = second.into_body().into_data_stream();
    assert_eq!(read_events(&mut first, 1).await.len(), 1);

    drop(first);
    assert_eq!(live.current(), 1);
    assert_eq!(read_events(&mut second, 2).await.len(), 2);
}

#[tokio::test]
async fn client_disconnect_releases_the_stream() {
    let state = AppState::new(
        make_pool(),
        Duration::from_millis(100),
        Duration::from_secs(15),
    );
    let live = state.service.live_streams().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    let client = reqwest::Client::new();
    let mut response = client
        .get(format!("http://{addr}/datasources/a/events"))
        .send()
        .await
        .expect("failed to connect to SSE stream");
    assert!(response.status().is_success());

    let chunk = response
        .chunk()
        .await
        .expect("failed to read chunk")
        .expect("stream closed");
    let chunk = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(chunk.starts_with("data:"), "unexpected frame: {chunk}");
    assert!(chunk.contains("Pressure"));
    assert_eq!(live.current(), 1);

    drop(response);
    drop(client);

    // The server notices on its next write at the latest.
    let deadline = Instant::now() + Duration::from_secs(3);
    while live.current() > 0 {
        assert!(
            Instant::now() < deadline,
            "stream was not released after disconnect"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
