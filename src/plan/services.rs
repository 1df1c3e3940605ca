use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::dto::{DayPlan, DietPlanRequest};
use super::extract::extract_days;
use crate::config::PerplexityConfig;

const SYSTEM_PROMPT: &str = "You are a diet planner AI. Return a JSON object with a key 'days'. \
'days' should be an array of objects, each containing: \
'day' (a UNIX timestamp), 'meals' (an array of objects with 'type' and 'description'), \
'snacks' (an array of objects with 'type' and 'description'), \
'macros' (an object with keys 'protein', 'carbs', 'fats'), and 'notes' (a string). \
Do not include any additional text or comments outside this JSON structure.";

/// Produces the days of a plan for one request.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, req: &DietPlanRequest) -> anyhow::Result<Vec<DayPlan>>;
}

/// Chat-completions backed generator (Perplexity API shape).
pub struct PerplexityPlanner {
    client: reqwest::Client,
    config: PerplexityConfig,
}

impl PerplexityPlanner {
    pub fn new(config: PerplexityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
    return_citations: bool,
    return_images: bool,
    return_related_questions: bool,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub(crate) fn user_prompt(req: &DietPlanRequest, days: u32) -> String {
    let mut prompt = format!(
        "Create a {}-day diet plan for a daily calorie limit of {} calories",
        days,
        req.calory_limit.trim()
    );
    if let Some(diet) = req.diet_type.as_deref().filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!(" following a {} diet", diet.trim()));
    }
    prompt.push_str(". Each day should include meals, snacks, macros, and notes.");
    prompt
}

#[async_trait]
impl PlanGenerator for PerplexityPlanner {
    #[instrument(skip(self, req), fields(calory_limit = %req.calory_limit))]
    async fn generate(&self, req: &DietPlanRequest) -> anyhow::Result<Vec<DayPlan>> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user_prompt(req, self.config.days),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.5,
            top_p: 0.9,
            stream: false,
            return_citations: false,
            return_images: false,
            return_related_questions: false,
            frequency_penalty: 1.0,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, "chat completion rejected");
            anyhow::bail!("chat completion returned {}", status);
        }

        let data: ChatResponse = response.json().await.context("decode chat completion")?;
        let content = data
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("chat completion has no choices")?;
        debug!(len = content.len(), "model answer received");

        extract_days(&content)
    }
}

#[cfg(test)]
mod services_tests {
    use super::*;

    #[test]
    fn prompt_mentions_calories_and_days() {
        let req = DietPlanRequest {
            calory_limit: " 2000 ".into(),
            diet_type: None,
        };
        let prompt = user_prompt(&req, 7);
        assert!(prompt.starts_with("Create a 7-day diet plan for a daily calorie limit of 2000 calories."));
    }

    #[test]
    fn prompt_includes_diet_type_when_given() {
        let req = DietPlanRequest {
            calory_limit: "1800".into(),
            diet_type: Some("vegan".into()),
        };
        assert!(user_prompt(&req, 3).contains("3-day diet plan for a daily calorie limit of 1800 calories following a vegan diet."));
    }

    #[test]
    fn blank_diet_type_is_ignored() {
        let req = DietPlanRequest {
            calory_limit: "1800".into(),
            diet_type: Some("  ".into()),
        };
        assert!(!user_prompt(&req, 7).contains("following"));
    }
}
