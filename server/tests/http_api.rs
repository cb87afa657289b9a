use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use eventdesk_server::config::Config;
use eventdesk_server::routes::{api_routes, create_routes};
use eventdesk_server::AppState;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Organizer, published event and one ticket type. Returns (event_id, ticket_type_id).
async fn seed(app: &Router, capacity: i32) -> (String, String) {
    let (status, organizer) = call(
        app,
        "POST",
        "/organizers",
        Some(json!({ "name": "Abuja Music Co", "contact_email": "ops@amc.ng" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, event) = call(
        app,
        "POST",
        "/events",
        Some(json!({
            "organizer_id": organizer["data"]["id"],
            "name": "Open Air Concert",
            "venue": "Millennium Park",
            "start_time": "2030-05-01T18:00:00Z",
            "max_attendees": capacity,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["data"]["status"], "draft");
    let event_id = event["data"]["id"].as_str().unwrap().to_string();

    let (status, ticket) = call(
        app,
        "POST",
        &format!("/events/{event_id}/ticket-types"),
        Some(json!({ "label": "Regular", "price": "5000.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        app,
        "PATCH",
        &format!("/events/{event_id}/status"),
        Some(json!({ "status": "published" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (event_id, ticket_id)
}

fn registration_body(ticket_id: &str, email: &str) -> Value {
    json!({
        "attendee": { "name": "Ada Obi", "email": email },
        "ticket_type_id": ticket_id,
        "quantity": 1,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = api_routes(AppState::in_memory());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn full_door_flow_over_http() {
    let app = api_routes(AppState::in_memory());
    let (event_id, ticket_id) = seed(&app, 5).await;

    let (status, receipt) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/register"),
        Some(registration_body(&ticket_id, "ada@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["data"]["registration"]["total_amount"], "5000.00");
    assert_eq!(receipt["data"]["registration"]["payment_status"], "pending");
    let token = receipt["data"]["ticket"]["token"].as_str().unwrap().to_string();
    let registration_id = receipt["data"]["registration"]["id"].as_str().unwrap().to_string();

    let (status, qr) = call(&app, "GET", &format!("/registrations/{registration_id}/qr"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(qr["data"]["payload"], token.as_str());

    let (status, _) = call(&app, "POST", &format!("/registrations/{registration_id}/qr"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, checked_in) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/checkin"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked_in["data"]["state"], "checked_in");
    assert_eq!(checked_in["data"]["attendance"]["method"], "qr_scan");

    let (status, dup) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/checkin"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["success"], false);
    assert_eq!(dup["error"]["code"], "DUPLICATE_CHECK_IN");

    let (status, stats) = call(&app, "GET", &format!("/events/{event_id}/attendee-stats"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["checked_in"], 1);
    assert_eq!(stats["data"]["tickets_sold"], 1);
    assert_eq!(stats["data"]["remaining_capacity"], 4);

    let (status, view) = call(&app, "GET", &format!("/registrations/{registration_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["attendance_state"], "checked_in");
}

#[tokio::test]
async fn error_statuses_follow_the_taxonomy() {
    let app = api_routes(AppState::in_memory());
    let (event_id, ticket_id) = seed(&app, 1).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/checkin"),
        Some(json!({ "token": "unknown-token" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, receipt) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/register"),
        Some(registration_body(&ticket_id, "first@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, full) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/register"),
        Some(registration_body(&ticket_id, "second@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(full["error"]["code"], "CAPACITY_EXCEEDED");
    assert_eq!(full["error"]["details"]["remaining"], 0);

    let registration_id = receipt["data"]["registration"]["id"].as_str().unwrap();
    let token = receipt["data"]["ticket"]["token"].as_str().unwrap();
    let (status, _) = call(&app, "POST", &format!("/registrations/{registration_id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/checkin"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REGISTRATION");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/register"),
        Some(json!({
            "attendee": { "name": "", "email": "x@example.com" },
            "ticket_type_id": ticket_id,
            "quantity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn draft_and_cancelled_events_refuse_registrations() {
    let app = api_routes(AppState::in_memory());
    let (event_id, ticket_id) = seed(&app, 3).await;
    let status_uri = format!("/events/{event_id}/status");
    let register_uri = format!("/events/{event_id}/register");

    let (status, event) = call(&app, "PATCH", &status_uri, Some(json!({ "status": "draft" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["data"]["status"], "draft");

    let (status, body) = call(
        &app,
        "POST",
        &register_uri,
        Some(registration_body(&ticket_id, "early@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REGISTRATION");

    let (status, _) = call(&app, "PATCH", &status_uri, Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "PATCH", &status_uri, Some(json!({ "status": "published" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        "POST",
        &register_uri,
        Some(registration_body(&ticket_id, "late@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_REGISTRATION");

    let (status, stats) = call(&app, "GET", &format!("/events/{event_id}/attendee-stats"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["total_registrations"], 0);
}

#[tokio::test]
async fn manual_check_in_without_body() {
    let app = api_routes(AppState::in_memory());
    let (event_id, ticket_id) = seed(&app, 3).await;

    let (_, receipt) = call(
        &app,
        "POST",
        &format!("/events/{event_id}/register"),
        Some(registration_body(&ticket_id, "walkin@example.com")),
    )
    .await;
    let registration_id = receipt["data"]["registration"]["id"].as_str().unwrap();

    let (status, body) = call(&app, "POST", &format!("/registrations/{registration_id}/checkin"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attendance"]["method"], "manual");

    let (status, body) = call(&app, "POST", &format!("/registrations/{registration_id}/checkout"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "checked_out");

    let (status, list) = call(&app, "GET", &format!("/events/{event_id}/attendees"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let config = Config::from_lookup(|_| None).unwrap();
    let app = create_routes(AppState::in_memory(), &config);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}
