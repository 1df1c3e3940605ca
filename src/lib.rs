pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod plan;
pub mod state;
pub mod telemetry;

pub use app::build_app;
pub use state::AppState;
