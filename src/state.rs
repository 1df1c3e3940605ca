use crate::config::AppConfig;
use crate::plan::services::{PerplexityPlanner, PlanGenerator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub planner: Arc<dyn PlanGenerator>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let planner =
            Arc::new(PerplexityPlanner::new(config.perplexity.clone())) as Arc<dyn PlanGenerator>;
        Ok(Self { config, planner })
    }

    pub fn from_parts(config: Arc<AppConfig>, planner: Arc<dyn PlanGenerator>) -> Self {
        Self { config, planner }
    }

    /// State backed by a generator that always returns `days`.
    pub fn fake(days: Vec<crate::plan::dto::DayPlan>) -> Self {
        use crate::plan::dto::{DayPlan, DietPlanRequest};
        use async_trait::async_trait;

        struct FakePlanner(Vec<DayPlan>);
        #[async_trait]
        impl PlanGenerator for FakePlanner {
            async fn generate(&self, _req: &DietPlanRequest) -> anyhow::Result<Vec<DayPlan>> {
                Ok(self.0.clone())
            }
        }

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            perplexity: crate::config::PerplexityConfig {
                api_key: "fake".into(),
                url: "http://fake.local/chat/completions".into(),
                model: "fake".into(),
                max_tokens: 16,
                days: 7,
            },
        });

        Self::from_parts(config, Arc::new(FakePlanner(days)) as Arc<dyn PlanGenerator>)
    }
}
