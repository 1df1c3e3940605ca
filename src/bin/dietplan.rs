use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dietplanner::client::{
    HttpBackend, Page, PlanBackend, PlanController, RenderMode, SubmitOutcome,
    TranslateController,
};
use dietplanner::telemetry;

#[derive(Parser)]
#[command(name = "dietplan")]
#[command(about = "Request a diet plan and render it as an HTML page", long_about = None)]
struct Cli {
    /// Daily calorie limit
    #[arg(long)]
    calories: String,

    /// Diet type (vegan, keto, ...); omit for a page without the diet selector
    #[arg(long)]
    diet: Option<String>,

    /// grid or calendar
    #[arg(long, default_value = "grid")]
    view: RenderMode,

    /// Translate the rendered page into this ISO 639-1 language
    #[arg(long)]
    lang: Option<String>,

    /// Server URL (default: http://localhost:8080)
    #[arg(long, default_value = "http://localhost:8080")]
    server: String,

    /// Translation endpoint, when it is not served at <server>/translate
    #[arg(long)]
    translate_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the page here instead of stdout
    #[arg(long)]
    out: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("dietplanner=info,dietplan=info");
    let cli = Cli::parse();

    let mut backend = HttpBackend::with_timeout(&cli.server, cli.timeout.map(Duration::from_secs))?;
    if let Some(url) = &cli.translate_url {
        backend = backend.translate_url(url.as_str());
    }
    let backend = Arc::new(backend) as Arc<dyn PlanBackend>;

    let mut page = match cli.diet.as_deref() {
        Some(_) => Page::new(),
        None => Page::without_diet_type(),
    };
    page.fill_form(&cli.calories, cli.diet.as_deref());
    page.select_language(cli.lang.as_deref());
    let page = Arc::new(Mutex::new(page));

    let plans = PlanController::new(backend.clone(), page.clone(), cli.view);
    let outcome = plans.submit().await;

    if cli.lang.is_some() && matches!(outcome, SubmitOutcome::Rendered { .. }) {
        let translator = TranslateController::new(backend, page.clone());
        // Failures are already on the page as alerts.
        let _ = translator.translate().await;
    }

    let page = page.lock().unwrap_or_else(PoisonError::into_inner);
    for alert in page.alerts() {
        eprintln!("alert: {}", alert);
    }
    let html = page.to_markup().into_string();
    match &cli.out {
        Some(path) => std::fs::write(path, html)?,
        None => println!("{}", html),
    }

    if !matches!(outcome, SubmitOutcome::Rendered { .. }) {
        anyhow::bail!("no diet plan rendered");
    }
    Ok(())
}
