//! Page-side controllers: the calorie form, plan rendering and batch
//! translation. Controllers receive their backend and page at construction.

pub mod api;
pub mod controller;
pub mod languages;
pub mod page;
pub mod render;
pub mod translate;

pub use api::{ClientError, HttpBackend, PlanBackend};
pub use controller::{PlanController, PlanForm, SubmitOutcome};
pub use page::{Page, View};
pub use render::{RenderMode, RenderedPlan};
pub use translate::{TranslateController, TranslateError};
