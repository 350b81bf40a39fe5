// libs/analytics-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use analytics_cell::analytics_routes;
use shared_config::AppConfig;

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = analytics_routes(Arc::new(AppConfig::default()))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn appointments() -> Value {
    json!([
        { "id": 1, "patient_id": 1, "doctor_id": 7, "appointment_date": "2024-01-05T10:00:00", "status": "completed" },
        { "id": 2, "patient_id": 2, "doctor_id": 7, "appointment_date": "2024-01-05 11:00", "status": "cancelled" },
        { "id": 3, "patient_id": 1, "doctor_id": 8, "appointment_date": "2024-01-06T09:00:00+05:30", "status": "scheduled" },
        { "id": "x-4", "patient_id": 2, "doctor_id": 8, "appointment_date": "not a date", "status": "scheduled" }
    ])
}

#[tokio::test]
async fn test_time_series_endpoint() {
    let (status, json) = post_json(
        "/time-series",
        json!({ "appointments": appointments(), "daily_days": 10, "now": "2024-01-06T12:00:00" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["invalid_records"], 1);
    assert_eq!(json["hourly"].as_array().unwrap().len(), 11);
    assert_eq!(json["daily"].as_array().unwrap().len(), 10);

    let jan = &json["monthly"][11];
    assert_eq!(jan["label"], "2024-01");
    assert_eq!(jan["total"], 3);
    assert_eq!(jan["completed"], 1);
    assert_eq!(jan["revenue"], 150.0);
}

#[tokio::test]
async fn test_time_series_rejects_oversized_window() {
    let (status, _) = post_json("/time-series", json!({ "appointments": [], "daily_days": 1000 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_breakdown_endpoint() {
    let (status, json) = post_json(
        "/breakdown",
        json!({
            "appointments": appointments(),
            "patients": [
                { "id": 1, "first_name": "Asha", "last_name": "Nair", "date_of_birth": "2004-01-06", "gender": "Female" },
                { "id": 2, "first_name": "Vikram", "last_name": "Singh", "date_of_birth": "1950-03-01" }
            ],
            "doctors": [
                { "id": 7, "first_name": "Meera", "last_name": "Iyer", "specialization": "Cardiology" }
            ],
            "now": "2024-01-06T12:00:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overview"]["total"], 4);
    assert_eq!(json["overview"]["completion_rate"], 0.25);
    assert_eq!(json["doctors"][0]["doctor_name"], "Dr. Meera Iyer");
    assert_eq!(json["doctors"][0]["total_appointments"], 2);
    assert_eq!(json["demographics"]["age_bands"][1], json!({ "band": "19-35", "count": 1 }));
    assert_eq!(json["demographics"]["age_bands"][4], json!({ "band": "65+", "count": 1 }));
    assert_eq!(json["demographics"]["genders"], json!({ "Female": 1 }));
    assert_eq!(json["invalid_records"], 1);
}

#[tokio::test]
async fn test_period_report_endpoint() {
    let (status, json) = post_json(
        "/reports/this-week",
        json!({ "appointments": appointments(), "now": "2024-01-06T12:00:00" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period"], "this-week");
    assert_eq!(json["start"], "2023-12-31T00:00:00");
    assert_eq!(json["total"], 3);
    assert_eq!(json["completion_rate"], 1.0 / 3.0);
}

#[tokio::test]
async fn test_unreadable_now_is_rejected() {
    for uri in ["/time-series", "/breakdown", "/reports/today"] {
        let (status, json) = post_json(uri, json!({ "appointments": appointments(), "now": "06/01/2024" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(json["error"].as_str().unwrap().contains("now"));
    }
}

#[tokio::test]
async fn test_date_only_now_means_midnight() {
    let (status, json) = post_json(
        "/reports/this-month",
        json!({ "appointments": appointments(), "now": "2024-01-31" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["start"], "2024-01-01T00:00:00");
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn test_unknown_status_is_counted_as_invalid() {
    let mut records = appointments();
    records.as_array_mut().unwrap().push(json!({
        "id": 5, "patient_id": 1, "doctor_id": 7, "appointment_date": "2024-01-05T15:00:00", "status": "no-show"
    }));

    let (status, json) = post_json(
        "/time-series",
        json!({ "appointments": records, "daily_days": 10, "now": "2024-01-06T12:00:00" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["invalid_records"], 2);
    assert_eq!(json["monthly"][11]["total"], 3);
}

#[tokio::test]
async fn test_missing_birth_date_does_not_fail_breakdown() {
    let (status, json) = post_json(
        "/breakdown",
        json!({
            "patients": [
                { "id": 1, "first_name": "Asha", "last_name": "Nair", "date_of_birth": null, "gender": "Female" },
                { "id": 2, "first_name": "Vikram", "last_name": "Singh", "date_of_birth": "yesterday" },
                { "id": 3, "first_name": "Ravi", "last_name": "Das", "date_of_birth": "1990-05-01" }
            ],
            "now": "2024-01-06T12:00:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["demographics"]["total_patients"], 3);
    assert_eq!(json["demographics"]["missing_birth_dates"], 2);
    assert_eq!(json["demographics"]["age_bands"][1], json!({ "band": "19-35", "count": 1 }));
    assert_eq!(json["demographics"]["genders"], json!({ "Female": 1 }));
}

#[tokio::test]
async fn test_period_report_csv_export() {
    let request = Request::builder()
        .method("POST")
        .uri("/reports/this-week/export")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "appointments": appointments(), "now": "2024-01-06T12:00:00" }).to_string(),
        ))
        .unwrap();

    let response = analytics_routes(Arc::new(AppConfig::default()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"this-week-report-2023-12-31.csv\""
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Metric,Value");
    assert!(lines.contains(&"Total Appointments,3"));
    assert!(lines.contains(&"Completion Rate,33.3%"));
}
