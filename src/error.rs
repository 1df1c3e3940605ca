use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors the HTTP layer answers with. Every variant renders as
/// `{"error": "..."}` so the page can show the message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error_type = "bad_request", message = %msg, "responding with 400");
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Upstream { message, source } => {
                tracing::error!(error_type = "upstream", error = %source, "responding with 500");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
