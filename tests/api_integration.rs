use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dietplanner::plan::dto::{DayPlan, DietPlanRequest, Macros, Meal};
use dietplanner::plan::services::PlanGenerator;
use dietplanner::{build_app, AppState};

// -- Helpers ------------------------------------------------------------------

fn oatmeal_day() -> DayPlan {
    DayPlan {
        day: 1_700_000_000,
        meals: vec![Meal {
            kind: "Breakfast".into(),
            description: "Oatmeal".into(),
        }],
        snacks: vec![],
        macros: Some(Macros {
            protein: 60.0,
            carbs: 200.0,
            fats: 50.0,
            calories: None,
        }),
        notes: Some("Stay hydrated".into()),
    }
}

struct FailingPlanner;

#[async_trait]
impl PlanGenerator for FailingPlanner {
    async fn generate(&self, _req: &DietPlanRequest) -> anyhow::Result<Vec<DayPlan>> {
        anyhow::bail!("upstream said 401")
    }
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let req = builder
        .body(Body::from(body.unwrap_or_default().to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = send(app, "POST", uri, Some(&body.to_string())).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// -- Tests --------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok() {
    let app = build_app(AppState::fake(vec![]));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn plan_endpoint_returns_days() {
    let app = build_app(AppState::fake(vec![oatmeal_day()]));
    let (status, body) = send_json(
        &app,
        "/api/diet-plan",
        json!({ "calory_limit": "1800", "diet_type": "vegan" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["day"], 1_700_000_000);
    assert_eq!(days[0]["meals"][0]["type"], "Breakfast");
    assert_eq!(days[0]["macros"]["fats"], 50.0);
}

#[tokio::test]
async fn missing_calorie_limit_is_400_with_error_body() {
    let app = build_app(AppState::fake(vec![oatmeal_day()]));
    let (status, body) = send_json(&app, "/api/diet-plan", json!({ "diet_type": "keto" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Calorie limit not provided.");

    let (status, body) = send_json(&app, "/api/diet-plan", json!({ "calory_limit": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Calorie limit not provided.");
}

#[tokio::test]
async fn numeric_calorie_limit_is_accepted() {
    let app = build_app(AppState::fake(vec![oatmeal_day()]));
    let (status, body) = send_json(&app, "/api/diet-plan", json!({ "calory_limit": 1800 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_plan_is_500_with_generic_message() {
    let app = build_app(AppState::fake(vec![]));
    let (status, body) = send_json(&app, "/api/diet-plan", json!({ "calory_limit": "1800" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch or parse diet plan." }));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let app = build_app(AppState::fake(vec![]));
    let (status, bytes) = send(&app, "POST", "/api/diet-plan", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn generator_failure_is_500_with_generic_message() {
    let base = AppState::fake(vec![]);
    let state = AppState::from_parts(base.config.clone(), Arc::new(FailingPlanner));
    let app = build_app(state);

    let (status, body) = send_json(&app, "/api/diet-plan", json!({ "calory_limit": "2000" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch or parse diet plan." }));
}

#[tokio::test]
async fn index_serves_the_page_shell() {
    let app = build_app(AppState::fake(vec![]));
    let (status, bytes) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("id=\"calorieForm\""));
    assert!(html.contains("<option value=\"ko\">Korean</option>"));
}
