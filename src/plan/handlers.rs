use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{DietPlanRequest, DietPlanResponse};
use crate::{client::page::Page, error::ApiError, state::AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/diet-plan", post(create_plan))
}

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// POST /api/diet-plan { calory_limit, diet_type? }
#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<DietPlanRequest>, JsonRejection>,
) -> Result<Json<DietPlanResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "diet plan body rejected");
        ApiError::BadRequest("Calorie limit not provided.".into())
    })?;
    if req.calory_limit.trim().is_empty() {
        return Err(ApiError::BadRequest("Calorie limit not provided.".into()));
    }

    let days = state
        .planner
        .generate(&req)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to fetch or parse diet plan.".into(),
            source,
        })?;
    if days.is_empty() {
        return Err(ApiError::Upstream {
            message: "Failed to fetch or parse diet plan.".into(),
            source: anyhow::anyhow!("model returned no days"),
        });
    }

    info!(days = days.len(), calory_limit = %req.calory_limit, "diet plan generated");
    Ok(Json(DietPlanResponse::Plan { days }))
}

/// GET / (empty page shell)
pub async fn index() -> Html<String> {
    Html(Page::new().to_markup().into_string())
}
