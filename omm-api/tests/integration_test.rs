use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use omm_api::{app, state::AuthConfig, AppState};
use omm_booking::WizardDeps;
use omm_core::{FixedClock, RecordingNotifier, TripCapacity, TripDetails, WizardSettings};
use omm_store::MemoryBackend;
use serde_json::{json, Value};
use futures_util::StreamExt;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

fn seeded() -> (Router, Arc<MemoryBackend>, Uuid) {
    let backend = Arc::new(MemoryBackend::new());
    let trip = TripDetails {
        id: Uuid::new_v4(),
        title: "Patagonia Circuit".to_string(),
        destination: "Torres del Paine, Chile".to_string(),
        start_date: NaiveDate::from_ymd_opt(2027, 2, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2027, 2, 20).unwrap(),
        price_cents: 320_000,
        currency: "USD".to_string(),
        max_participants: 10,
        sensei: None,
    };
    backend.put_capacity(TripCapacity {
        trip_id: trip.id,
        max_participants: 10,
        current_participants: 7,
    });
    let trip_id = trip.id;
    backend.put_trip(trip);

    let deps = WizardDeps {
        trips: backend.clone(),
        bookings: backend.clone(),
        profiles: backend.clone(),
        store: backend.clone(),
        notifier: Arc::new(RecordingNotifier::default()),
        clock: Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap())),
        settings: WizardSettings::default(),
    };
    let state = AppState::new(
        deps,
        AuthConfig {
            secret: "integration-secret".to_string(),
            expiration: 3600,
        },
    );

    (app(state), backend, trip_id)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn guest_token(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/auth/guest", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_booking_routes_require_token() {
    let (app, _, trip_id) = seeded();
    let uri = format!("/v1/trips/{}/booking", trip_id);

    let (status, _) = send(&app, Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, &uri, Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_open_unknown_trip_is_not_found() {
    let (app, _, _) = seeded();
    let token = guest_token(&app).await;

    let uri = format!("/v1/trips/{}/booking", Uuid::new_v4());
    let (status, _) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_without_open_session_is_not_found() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;

    let uri = format!("/v1/trips/{}/booking", trip_id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_open_returns_first_step_and_availability() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;

    let uri = format!("/v1/trips/{}/booking", trip_id);
    let (status, view) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["step_index"], 0);
    assert_eq!(view["current_step"], "trip_review");
    assert_eq!(view["current_step_definition"]["title"], "Trip Details");
    assert_eq!(view["mode"], "full");
    assert_eq!(view["draft"]["participants"].as_array().unwrap().len(), 1);
    assert_eq!(view["draft"]["total_cents"], 320_000);
    assert_eq!(view["is_returning_customer"], false);
}

#[tokio::test]
async fn test_advance_with_blank_participant_is_unprocessable() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;
    let base = format!("/v1/trips/{}/booking", trip_id);
    send(&app, Method::POST, &base, Some(&token), None).await;

    // Trip review has nothing to validate
    let (status, view) = send(&app, Method::POST, &format!("{}/advance", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_step"], "participants");

    let (status, body) = send(&app, Method::POST, &format!("{}/advance", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("First name required for participant 1")));
    assert!(errors.contains(&json!("Emergency contact name required")));

    let (status, view) = send(&app, Method::POST, &format!("{}/retreat", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_step"], "trip_review");
}

#[tokio::test]
async fn test_remove_primary_participant_conflicts() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;
    let base = format!("/v1/trips/{}/booking", trip_id);
    let (_, view) = send(&app, Method::POST, &base, Some(&token), None).await;
    let primary_id = view["draft"]["participants"][0]["id"].as_str().unwrap().to_string();

    let (status, added) = send(&app, Method::POST, &format!("{}/participants", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["wizard"]["draft"]["total_cents"], 640_000);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{}/participants/{}", base, primary_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let companion_id = added["participant_id"].as_str().unwrap();
    let (status, view) = send(
        &app,
        Method::DELETE,
        &format!("{}/participants/{}", base, companion_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["draft"]["total_cents"], 320_000);
}

#[tokio::test]
async fn test_quick_booking_submits() {
    let (app, backend, trip_id) = seeded();
    let token = guest_token(&app).await;
    let base = format!("/v1/trips/{}/booking", trip_id);
    let (_, view) = send(&app, Method::POST, &base, Some(&token), None).await;
    let primary_id = view["draft"]["participants"][0]["id"].as_str().unwrap().to_string();

    let (_, view) = send(&app, Method::PUT, &format!("{}/mode", base), Some(&token), Some(json!({ "mode": "quick" }))).await;
    assert_eq!(view["current_step"], "participants");

    for (field, value) in [
        ("first_name", "Lucia"),
        ("last_name", "Rojas"),
        ("email", "lucia@example.com"),
        ("phone", "+56 9 5555 0101"),
        ("date_of_birth", "1990-05-12"),
    ] {
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("{}/participants/{}", base, primary_id),
            Some(&token),
            Some(json!({ "field": field, "value": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, view) = send(&app, Method::POST, &format!("{}/advance", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_step"], "payment");

    let (_, view) = send(
        &app,
        Method::PUT,
        &format!("{}/payment-plan", base),
        Some(&token),
        Some(json!({ "payment_plan": "deposit" })),
    )
    .await;
    assert_eq!(view["draft"]["deposit_cents"], 96_000);

    let (status, view) = send(&app, Method::POST, &format!("{}/advance", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["is_last_step"], true);

    // Terms not yet accepted
    let (status, _) = send(&app, Method::POST, &format!("{}/submit", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    send(
        &app,
        Method::PUT,
        &format!("{}/consents", base),
        Some(&token),
        Some(json!({ "agreed_to_terms": true, "agreed_to_cancellation_policy": true })),
    )
    .await;

    let (status, body) = send(&app, Method::POST, &format!("{}/submit", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["booking_id"].as_str().unwrap();
    assert_eq!(body["redirect_to"], format!("/bookings/{}/confirmation", booking_id));

    let bookings = backend.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].payment_plan, "deposit");
    assert_eq!(bookings[0].total_cents, 320_000);

    // A submitted booking unmounts its wizard
    let (status, _) = send(&app, Method::POST, &format!("{}/submit", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &base, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_removes_session() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;
    let base = format!("/v1/trips/{}/booking", trip_id);
    send(&app, Method::POST, &base, Some(&token), None).await;

    let (status, _) = send(&app, Method::DELETE, &base, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &base, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_stream_emits_snapshot() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;
    let base = format!("/v1/trips/{}/booking", trip_id);
    send(&app, Method::POST, &base, Some(&token), None).await;

    let request = Request::builder()
        .uri(format!("{}/availability/stream", base))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let mut buffer = String::new();
    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.contains("\n\n") {
            let chunk = body.next().await.unwrap().unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        buffer.clone()
    })
    .await
    .unwrap();

    assert!(frame.contains("event: availability"));
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["trip_id"], trip_id.to_string());
    assert_eq!(event["spots_left"], 3);
    assert_eq!(event["is_available"], true);
}

#[tokio::test]
async fn test_availability_stream_requires_open_session() {
    let (app, _, trip_id) = seeded();
    let token = guest_token(&app).await;

    let uri = format!("/v1/trips/{}/booking/availability/stream", trip_id);
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
