//! Heatmap API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use speedmap::domain::{LocationRecord, Reading, SpeedTestRecord, TestId};

use crate::common::{body_json, unique_session, TestApp};

fn speed_row(id: i64, download: Option<Reading>) -> SpeedTestRecord {
    SpeedTestRecord {
        test_id: TestId(id),
        download,
        upload: None,
        ping: None,
    }
}

fn location_row(id: i64, latitude: &str, longitude: &str) -> LocationRecord {
    LocationRecord {
        test_id: TestId(id),
        latitude: latitude.into(),
        longitude: longitude.into(),
    }
}

#[tokio::test]
async fn test_empty_store_yields_fallback_max() {
    let app = TestApp::new().await;

    let response = app.get("/heatmap-data").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"max": 1.0, "data": []}));
}

#[tokio::test]
async fn test_records_without_location_are_skipped() {
    let app = TestApp::new().await;
    app.records
        .insert_speed_test(speed_row(100001, Some(Reading::Number(80.0))));
    app.records
        .insert_speed_test(speed_row(100002, Some(Reading::Number(20.0))));

    let body = body_json(app.get("/heatmap-data").await).await;

    assert_eq!(body, json!({"max": 1.0, "data": []}));
}

#[tokio::test]
async fn test_points_and_max() {
    let app = TestApp::new().await;
    app.records
        .insert_speed_test(speed_row(100001, Some(Reading::from("30.5"))));
    app.records
        .insert_location(location_row(100001, "43.037944", "-76.132194"));
    app.records
        .insert_speed_test(speed_row(100002, Some(Reading::from("Fail"))));
    app.records
        .insert_location(location_row(100002, "43.037278", "-76.132944"));
    // Unmappable location
    app.records
        .insert_speed_test(speed_row(100003, Some(Reading::Number(99.0))));
    app.records
        .insert_location(location_row(100003, "north", "-76.132944"));

    let body = body_json(app.get("/heatmap-data").await).await;

    assert_eq!(
        body,
        json!({
            "max": 30.5,
            "data": [
                {"x": 0, "y": 0, "value": 30.5},
                {"x": 1002, "y": 799, "value": 0.0},
            ]
        })
    );
}

#[tokio::test]
async fn test_zero_speeds_keep_max_at_one() {
    let app = TestApp::new().await;
    app.records.insert_speed_test(speed_row(100001, None));
    app.records
        .insert_location(location_row(100001, "43.0376", "-76.1325"));

    let body = body_json(app.get("/heatmap-data").await).await;

    assert_eq!(body["max"], 1.0);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["value"], 0.0);
}

#[tokio::test]
async fn test_submitted_measurement_appears_on_heatmap() {
    let app = TestApp::new().await;
    let session = unique_session();
    let id = app.generate_id(&session).await;

    let location = app
        .post_json(
            "/save_location",
            json!({"latitude": 43.0376, "longitude": -76.1325, "id": id, "session_id": session}),
        )
        .await;
    assert_eq!(location.status(), StatusCode::OK);

    let speed = app
        .post_json(
            "/submit-speed",
            json!({"dlStatus": "64.2", "ulStatus": "8.1", "pingStatus": "22", "session_id": session}),
        )
        .await;
    assert_eq!(speed.status(), StatusCode::OK);

    let body = body_json(app.get("/heatmap-data").await).await;

    assert_eq!(body["max"], 64.2);
    assert_eq!(body["data"][0]["value"], 64.2);
}
