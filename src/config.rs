use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PerplexityConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Number of days asked for in each plan.
    pub days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub perplexity: PerplexityConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let perplexity = PerplexityConfig {
            api_key: std::env::var("PERPLEXITY_API_KEY")?,
            url: std::env::var("PERPLEXITY_URL")
                .unwrap_or_else(|_| "https://api.perplexity.ai/chat/completions".into()),
            model: std::env::var("PERPLEXITY_MODEL")
                .unwrap_or_else(|_| "llama-3.1-sonar-small-128k-online".into()),
            max_tokens: std::env::var("PERPLEXITY_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5000),
            days: std::env::var("PLAN_DAYS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|d| *d > 0)
                .unwrap_or(7),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            perplexity,
        })
    }
}
