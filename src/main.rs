use dietplanner::{app, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("dietplanner=debug,axum=info,tower_http=info");

    let app_state = AppState::init()?;
    let (host, port) = (app_state.config.host.clone(), app_state.config.port);
    tracing::info!(
        model = %app_state.config.perplexity.model,
        days = app_state.config.perplexity.days,
        "diet plan backend configured"
    );

    app::serve(app::build_app(app_state), &host, port).await
}
