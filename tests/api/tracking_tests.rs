//! Live session and measurement API tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, unique_session, TestApp, FIXED_RESULT};

const INSIDE: (f64, f64) = (43.0376, -76.1325);

#[tokio::test]
async fn test_generate_id_is_in_range_and_resolves() {
    let app = TestApp::new().await;
    let session = unique_session();

    let id = app.generate_id(&session).await;

    assert!((100_000..=999_999).contains(&id));
    assert_eq!(app.state.ids.resolve(&session).map(|t| t.as_i64()), Some(id));
}

#[tokio::test]
async fn test_generate_id_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/generate_unique_id").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing session_id parameter");
}

#[tokio::test]
async fn test_submit_speed_without_id_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/submit-speed",
            json!({"dlStatus": "50", "ulStatus": "10", "pingStatus": "20", "session_id": unique_session()}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 10008);
    assert_eq!(app.records.speed_test_count(), 0);
}

#[tokio::test]
async fn test_submit_speed_stores_under_generated_id() {
    let app = TestApp::new().await;
    let session = unique_session();
    let id = app.generate_id(&session).await;

    let response = app
        .post_json(
            "/submit-speed",
            json!({"dlStatus": "42.5", "ulStatus": "Fail", "pingStatus": 18, "session_id": session}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({"message": "Speed test results saved!", "id": id}));
    assert_eq!(app.records.speed_test_count(), 1);
}

#[tokio::test]
async fn test_save_location_validates_fields() {
    let app = TestApp::new().await;

    let missing_id = app
        .post_json("/save_location", json!({"latitude": 43.0, "longitude": -76.0}))
        .await;
    let missing_lon = app
        .post_json("/save_location", json!({"latitude": 43.0, "id": 123456}))
        .await;
    let bad_lat = app
        .post_json(
            "/save_location",
            json!({"latitude": "north", "longitude": -76.0, "id": 123456}),
        )
        .await;

    assert_eq!(missing_id.status(), StatusCode::BAD_REQUEST);
    assert_eq!(missing_lon.status(), StatusCode::BAD_REQUEST);
    assert_eq!(bad_lat.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.records.location_count(), 0);
}

#[tokio::test]
async fn test_save_location_accepts_string_values() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/save_location",
            json!({"latitude": "43.0376", "longitude": "-76.1325", "id": "123456"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 123456);
    assert_eq!(app.records.location_count(), 1);
}

#[tokio::test]
async fn test_live_location_round_trip() {
    let app = TestApp::new().await;
    let session = unique_session();

    app.report_location(&session, INSIDE.0, INSIDE.1).await;
    let response = app.get(&format!("/get-live-location/{session}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["in_bounds"], true);
    assert!(body["x"].as_u64().unwrap() < 1003);
    assert!(body["y"].as_u64().unwrap() < 800);
}

#[tokio::test]
async fn test_live_location_out_of_bounds_is_clamped() {
    let app = TestApp::new().await;
    let session = unique_session();

    app.report_location(&session, 44.0, -77.0).await;
    let body = body_json(app.get(&format!("/get-live-location/{session}")).await).await;

    assert_eq!(
        body,
        json!({"x": 0, "y": 799, "in_bounds": false, "found": true})
    );
}

#[tokio::test]
async fn test_live_location_unknown_session() {
    let app = TestApp::new().await;

    let response = app.get("/get-live-location/nobody").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"found": false, "reason": "No recent data for session"})
    );
}

#[tokio::test]
async fn test_save_user_location_reports_missing_fields() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/save_user_location", json!({"latitude": 43.0}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing required fields: longitude, session_id");
}

#[tokio::test]
async fn test_save_user_location_rejects_non_numeric() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/save_user_location",
            json!({"latitude": "up", "longitude": -76.0, "session_id": "s"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.state.sessions.get("s").is_none());
}

#[tokio::test]
async fn test_wrongly_typed_body_gets_structured_error() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/save_user_location",
            json!({"latitude": true, "longitude": -76.0, "session_id": "s"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 10002);
    assert_eq!(body["message"], "Invalid data format");
    assert!(app.state.sessions.get("s").is_none());
}

#[tokio::test]
async fn test_malformed_json_gets_structured_error() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Request::builder()
                .method("POST")
                .uri("/submit-speed")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 10002);
    assert_eq!(body["message"], "Malformed JSON body");
}

#[tokio::test]
async fn test_sessions_listing_and_lookup() {
    let app = TestApp::new().await;
    let session = unique_session();
    app.report_location(&session, INSIDE.0, INSIDE.1).await;

    let sessions = body_json(app.get("/get_all_sessions").await).await;
    let last_seen = sessions[&session].as_str().unwrap();
    assert!(last_seen.ends_with(" UTC"));

    let location = body_json(app.get(&format!("/get_location/{session}")).await).await;
    assert_eq!(location["latitude"], INSIDE.0);
    assert_eq!(location["longitude"], INSIDE.1);
    assert_eq!(location["last_seen"], last_seen);
}

#[tokio::test]
async fn test_get_location_unknown_session_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/get_location/nobody").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cleanup_evicts_session_and_its_id() {
    let app = TestApp::new().await;
    let session = unique_session();
    app.generate_id(&session).await;
    app.report_location(&session, INSIDE.0, INSIDE.1).await;

    let report = app
        .state
        .cleanup_scheduler()
        .sweep(Utc::now() + Duration::seconds(1801));

    assert_eq!(report.evicted, vec![session.clone()]);

    let live = body_json(app.get(&format!("/get-live-location/{session}")).await).await;
    assert_eq!(live["found"], false);

    let submit = app
        .post_json(
            "/submit-speed",
            json!({"dlStatus": "1", "ulStatus": "1", "pingStatus": "1", "session_id": session}),
        )
        .await;
    assert_eq!(submit.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cleanup_keeps_recent_sessions() {
    let app = TestApp::new().await;
    let session = unique_session();
    app.report_location(&session, INSIDE.0, INSIDE.1).await;

    let report = app
        .state
        .cleanup_scheduler()
        .sweep(Utc::now() + Duration::seconds(60));

    assert!(report.evicted.is_empty());
    assert!(app.state.sessions.get(&session).is_some());
}

#[tokio::test]
async fn test_server_speed_test_is_saved_and_formatted() {
    let app = TestApp::new().await;
    let session = unique_session();

    let response = app
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri(format!("/speed_test?session_id={session}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["download"], format!("{:.2} Mbps", FIXED_RESULT.download_mbps));
    assert_eq!(body["upload"], "12.30 Mbps");
    assert_eq!(body["ping"], "14 ms");
    assert_eq!(
        app.state.ids.resolve(&session).map(|t| t.as_i64()),
        body["id"].as_i64()
    );
    assert_eq!(app.records.speed_test_count(), 1);
}
