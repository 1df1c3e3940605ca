use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::plan::dto::{DietPlanRequest, DietPlanResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub q: Vec<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}")]
    Status {
        status: u16,
        /// `error` field of the body, when the body carried one.
        message: Option<String>,
    },
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

impl ClientError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            ClientError::Status {
                message: Some(msg), ..
            } => format!("Error: {}", msg),
            ClientError::Status {
                status,
                message: None,
            } => format!("Request failed with status {}. Please try again.", status),
            ClientError::UnexpectedFormat(_) => {
                "Unexpected response format from the server.".to_string()
            }
        }
    }
}

/// The two backend endpoints the page talks to.
#[async_trait]
pub trait PlanBackend: Send + Sync {
    async fn fetch_plan(&self, req: &DietPlanRequest) -> Result<DietPlanResponse, ClientError>;
    async fn translate(&self, req: &TranslateRequest) -> Result<TranslateResponse, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `reqwest` implementation rooted at the server's base URL.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    plan_url: String,
    translate_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client: builder.build()?,
            plan_url: format!("{}/api/diet-plan", base),
            translate_url: format!("{}/translate", base),
        })
    }

    /// Sends translations somewhere other than `<base>/translate`.
    pub fn translate_url(mut self, url: impl Into<String>) -> Self {
        self.translate_url = url.into();
        self
    }

    async fn post_json<Req, Res>(&self, url: &str, body: &Req) -> Result<Res, ClientError>
    where
        Req: Serialize + Sync,
        Res: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .map(|b| b.error);
            warn!(%status, url, message = ?message, "request rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, body = %String::from_utf8_lossy(&bytes), "unexpected body");
            ClientError::UnexpectedFormat(e.to_string())
        })
    }
}

#[async_trait]
impl PlanBackend for HttpBackend {
    #[instrument(skip(self, req))]
    async fn fetch_plan(&self, req: &DietPlanRequest) -> Result<DietPlanResponse, ClientError> {
        debug!(url = %self.plan_url, "POST diet plan");
        self.post_json(&self.plan_url, req).await
    }

    #[instrument(skip(self, req), fields(lang = %req.target, texts = req.q.len()))]
    async fn translate(&self, req: &TranslateRequest) -> Result<TranslateResponse, ClientError> {
        debug!(url = %self.translate_url, "POST translate");
        self.post_json(&self.translate_url, req).await
    }
}

#[cfg(test)]
mod api_tests {
    use super::*;

    #[test]
    fn urls_are_joined_onto_base() {
        let backend = HttpBackend::new("http://localhost:8080/").unwrap();
        assert_eq!(backend.plan_url, "http://localhost:8080/api/diet-plan");
        assert_eq!(backend.translate_url, "http://localhost:8080/translate");
        let backend = backend.translate_url("http://translator.local/translate");
        assert_eq!(backend.translate_url, "http://translator.local/translate");
    }

    #[test]
    fn user_messages_prefer_server_text() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Calorie limit not provided.".into()),
        };
        assert_eq!(err.user_message(), "Error: Calorie limit not provided.");
        let err = ClientError::Status {
            status: 503,
            message: None,
        };
        assert!(err.user_message().contains("503"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is closed on test machines.
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let req = DietPlanRequest {
            calory_limit: "1800".into(),
            diet_type: None,
        };
        let err = backend.fetch_plan(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
