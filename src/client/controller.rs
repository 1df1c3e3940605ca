use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, instrument, warn};

use super::api::{ClientError, PlanBackend};
use super::page::View;
use super::render::RenderMode;
use crate::plan::dto::{DietPlanRequest, DietPlanResponse};

/// Raw field values as read from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanForm {
    pub calory_limit: String,
    /// `None` when the page has no diet-type field.
    pub diet_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please enter a calorie limit.")]
    MissingCalories,
    #[error("Please enter a valid calorie limit greater than 0.")]
    InvalidCalories,
    #[error("Please select a diet type.")]
    MissingDietType,
}

impl PlanForm {
    pub fn validate(&self) -> Result<DietPlanRequest, FormError> {
        let raw = self.calory_limit.trim();
        if raw.is_empty() {
            return Err(FormError::MissingCalories);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => {}
            _ => return Err(FormError::InvalidCalories),
        }
        let diet_type = match &self.diet_type {
            None => None,
            Some(d) if d.trim().is_empty() => return Err(FormError::MissingDietType),
            Some(d) => Some(d.trim().to_string()),
        };
        Ok(DietPlanRequest {
            calory_limit: raw.to_string(),
            diet_type,
        })
    }
}

/// What one submission ended with.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    Rendered { days: usize },
    Invalid(FormError),
    /// The server answered with an `error` body.
    Rejected(String),
    Failed(String),
    /// A newer submission was issued before this one settled.
    Superseded,
}

/// Handles submissions of the calorie form.
pub struct PlanController<V> {
    backend: Arc<dyn PlanBackend>,
    view: Arc<Mutex<V>>,
    mode: RenderMode,
    latest: AtomicU64,
}

impl<V: View> PlanController<V> {
    pub fn new(backend: Arc<dyn PlanBackend>, view: Arc<Mutex<V>>, mode: RenderMode) -> Self {
        Self {
            backend,
            view,
            mode,
            latest: AtomicU64::new(0),
        }
    }

    fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    #[instrument(skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let form = self.view().read_form();
        let request = match form.validate() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "form rejected");
                self.view().alert(&e.to_string());
                return SubmitOutcome::Invalid(e);
            }
        };

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.view().set_loading(true);
        debug!(token, calory_limit = %request.calory_limit, "requesting diet plan");

        let result = self.backend.fetch_plan(&request).await;

        if !self.is_current(token) {
            debug!(token, "stale diet plan response ignored");
            return SubmitOutcome::Superseded;
        }

        let mut view = self.view();
        view.set_loading(false);

        match result {
            Ok(DietPlanResponse::Failure { error }) => {
                warn!(error = %error, "server reported an error");
                view.alert(&format!("Error: {}", error));
                SubmitOutcome::Rejected(error)
            }
            Ok(DietPlanResponse::Plan { days }) => match self.mode.render(&days) {
                Ok(plan) => {
                    info!(days = days.len(), mode = ?self.mode, "diet plan rendered");
                    view.show_plan(plan);
                    SubmitOutcome::Rendered { days: days.len() }
                }
                Err(e) => {
                    error!(error = %e, "diet plan could not be rendered");
                    let message = ClientError::UnexpectedFormat(e.to_string()).user_message();
                    view.alert(&message);
                    SubmitOutcome::Failed(message)
                }
            },
            Err(e) => {
                error!(error = %e, "diet plan request failed");
                let message = e.user_message();
                view.alert(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }
}
