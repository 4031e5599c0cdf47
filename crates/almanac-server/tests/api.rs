use std::sync::Arc;

use almanac_server::store::FileStore;
use almanac_server::{AppState, build_router};
use almanac_shared::event::Event;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

const ORIGIN: &str = "https://hty1206.github.io";

fn app() -> (TempDir, Router) {
    let temp = tempdir().expect("tempdir");
    let store = FileStore::open(
        &temp.path().join("events.json"),
        &temp.path().join("academic_events.json"),
        "Academic Calendar",
    )
    .expect("open store");
    let router = build_router(AppState::new(Arc::new(store)), ORIGIN).expect("router");
    (temp, router)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn study_session_round_trip() {
    let (_temp, app) = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(r#"{"title":"Study Session","date":"2025-03-01","tag":"Academic Calendar"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Event = serde_json::from_value(created).expect("event");
    let id = created.id.expect("generated id");
    assert_eq!(created.source.as_deref(), Some("user"));

    let (status, listed) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Event> = serde_json::from_value(listed).expect("events");
    assert!(listed.iter().any(|e| e.id == Some(id) && e.title == "Study Session"));

    let uri = format!("/api/events/{id}");
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], Value::Bool(true));

    let (_, listed) = send(&app, Method::GET, "/api/events", None).await;
    let listed: Vec<Event> = serde_json::from_value(listed).expect("events");
    assert!(listed.iter().all(|e| e.id != Some(id)));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn listing_is_ordered_by_date_then_start() {
    let (_temp, app) = app();
    for body in [
        r#"{"title":"Late","date":"2025-03-02","tag":"Personal","start":"9:00"}"#,
        r#"{"title":"Second","date":"2025-03-01","tag":"Personal","start":"14:00"}"#,
        r#"{"title":"First","date":"2025-03-01","tag":"Personal","start":"08:00"}"#,
    ] {
        let (status, _) = send(&app, Method::POST, "/api/events", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = send(&app, Method::GET, "/api/events", None).await;
    let titles: Vec<String> = serde_json::from_value::<Vec<Event>>(listed)
        .expect("events")
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Late"]);
}

#[tokio::test]
async fn same_day_starts_sort_by_clock_time() {
    let (_temp, app) = app();
    for (title, start) in [
        ("Morning", "9:00am"),
        ("Late morning", "10:30am"),
        ("Evening", "7:00pm"),
        ("Lunch", "12:15pm"),
    ] {
        let body = serde_json::json!({
            "title": title,
            "date": "2025-03-01",
            "tag": "Personal",
            "start": start,
        })
        .to_string();
        let (status, _) = send(&app, Method::POST, "/api/events", Some(&body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = send(&app, Method::GET, "/api/events", None).await;
    let titles: Vec<String> = serde_json::from_value::<Vec<Event>>(listed)
        .expect("events")
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["Morning", "Late morning", "Lunch", "Evening"]);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let (_temp, app) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(r#"{"title":"Study Session","date":"2025-03-01"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title, date, and tag are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(r#"{"title":"Pickup","date":"2025-03-01","tag":"Sports Events"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(r#"{"title":"Bogus","date":"2025-02-30","tag":"Personal"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("2025-02-30")));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(r#"{"title":"Bogus","date":"someday","tag":"Personal"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(listed, Value::Array(Vec::new()));

    let (status, body) = send(&app, Method::POST, "/api/events", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/api/events/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn options_short_circuits_with_cors_headers() {
    let (_temp, app) = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/events")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ORIGIN)
    );

    let (status, _) = send(&app, Method::OPTIONS, "/api/events/123", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn academic_events_and_health() {
    let (temp, app) = app();
    std::fs::write(
        temp.path().join("academic_events.json"),
        r#"[{"date":"2025-01-21T00:00:00Z","endDate":"2025-01-21","title":"Classes begin","tag":"Academic Calendar"}]"#,
    )
    .expect("seed academic");

    let (status, body) = send(&app, Method::GET, "/api/academic-events", None).await;
    assert_eq!(status, StatusCode::OK);
    let events: Vec<Event> = serde_json::from_value(body).expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].date, "2025-01-21");

    let (status, body) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}
