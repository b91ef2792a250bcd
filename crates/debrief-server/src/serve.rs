use crate::config::DebriefConfig;
use crate::gemini::GeminiClient;
use crate::http::{self, metrics::DebriefMetrics, AppState};
use crate::session::{SessionManager, SharedService};
use debrief_core::{demo_report, IntelligenceClient, ReportHistory};
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn run(config: DebriefConfig) -> anyhow::Result<()> {
    info!("Starting Debrief server v{}", env!("CARGO_PKG_VERSION"));

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config: {}", e);
        }
        anyhow::bail!("Invalid configuration ({} error(s))", errors.len());
    }
    let addr = config.http_addr()?;

    let gemini = GeminiClient::new(config.gemini.clone())?;
    info!("Model: {} via {}", config.gemini.model, gemini.endpoint());
    if !gemini.api_key_present() {
        // Read per request, so it can still be provided later.
        warn!(
            "{} is not set; analyses will fail until it is",
            config.gemini.api_key_env
        );
    }
    info!("Parse policy: {:?}", config.analysis.parse_policy);

    let service: SharedService = Arc::new(gemini);
    let client = IntelligenceClient::new(service).with_policy(config.analysis.parse_policy);

    let history = if config.history.seed_demo {
        ReportHistory::with_seed(vec![demo_report()])
    } else {
        ReportHistory::new()
    };
    info!("History seeded with {} report(s)", history.len());

    let metrics = Arc::new(DebriefMetrics::new());
    let sessions = Arc::new(
        SessionManager::new(client, history, config.progress.clone(), metrics.clone())
            .with_retention(config.sessions.clone()),
    );

    let state = AppState {
        sessions,
        metrics,
        start_time: std::time::Instant::now(),
        max_body_bytes: config.server.max_body_bytes,
    };

    let app = http::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP: listening on {}", addr);

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server failed: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, terminating...");

    http_task.abort();
    info!("Debrief server stopped");
    Ok(())
}
