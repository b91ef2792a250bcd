use super::{AppError, AppResult, AppState, JsonResponse, INDEX_HTML};
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use debrief_core::{
    response_schema, AdvisoryLimits, AnalysisInput, IntelligenceReport, ReportId, SessionCollector,
    UploadedFile,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::session::{SessionId, SessionView};

pub fn create_router(state: AppState) -> Router {
    let max_body = state.max_body_bytes;
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/schema", get(schema))
        .route("/metrics", get(metrics))
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(get_session).delete(cancel_session))
        .route("/sessions/:id/events", get(session_events))
        .route("/analyze", post(analyze))
        .route("/reports", get(list_reports))
        .route("/reports/:id", get(get_report))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    healthy: bool,
    version: String,
    uptime_seconds: u64,
    model: String,
    history_size: usize,
}

async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthResponse>> {
    Json(JsonResponse::ok(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.sessions.model_name().to_string(),
        history_size: state.sessions.history_len(),
    }))
}

async fn schema() -> Json<JsonResponse<serde_json::Value>> {
    Json(JsonResponse::ok(response_schema()))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .history_size
        .set(state.sessions.history_len() as i64);
    state
        .metrics
        .uptime_seconds
        .set(state.start_time.elapsed().as_secs() as i64);
    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        state.metrics.encode(),
    )
}

/// Upload form as the front end submits it.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AnalyzeBody {
    notes: String,
    slides_text: String,
    context: String,
    files: Vec<UploadedFile>,
}

/// Run the body through a collector so advisories are computed the same way
/// the front end shows them. Nothing is rejected.
fn collect(body: AnalyzeBody) -> (AnalysisInput, Vec<String>) {
    let mut collector = SessionCollector::new();
    collector.set_notes(body.notes);
    collector.set_slides_text(body.slides_text);
    collector.set_context(body.context);
    for file in body.files {
        collector.add_file(file);
    }
    let advisories = collector.advisories(&AdvisoryLimits::default());
    (collector.take(), advisories)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartedSession {
    session_id: SessionId,
    advisories: Vec<String>,
}

async fn start_session(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> impl IntoResponse {
    let (input, advisories) = collect(body);
    for a in &advisories {
        info!("Upload advisory: {}", a);
    }
    let session_id = state.sessions.start(input);
    (
        StatusCode::ACCEPTED,
        Json(JsonResponse::ok(StartedSession {
            session_id,
            advisories,
        })),
    )
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Json<JsonResponse<SessionView>>> {
    let view = state
        .sessions
        .status(id)
        .ok_or_else(|| AppError::not_found(format!("Session {}", id)))?;
    Ok(Json(JsonResponse::ok(view)))
}

async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Json<JsonResponse<serde_json::Value>>> {
    let cancelled = state
        .sessions
        .cancel(id)
        .ok_or_else(|| AppError::not_found(format!("Session {}", id)))?;
    Ok(Json(JsonResponse::ok(serde_json::json!({
        "sessionId": id,
        "cancelled": cancelled,
    }))))
}

/// Status updates until the session settles.
async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let mut rx = state
        .sessions
        .subscribe(id)
        .ok_or_else(|| AppError::not_found(format!("Session {}", id)))?;

    let stream = async_stream::stream! {
        loop {
            let status = rx.borrow_and_update().clone();
            let settled = !status.is_running();
            yield Ok(Event::default().event("status").json_data(&status).unwrap_or_default());
            if settled || rx.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> AppResult<Json<JsonResponse<IntelligenceReport>>> {
    let (input, _advisories) = collect(body);
    match state.sessions.run(input).await {
        Ok(report) => Ok(Json(JsonResponse::ok(report))),
        Err(e) => Err(AppError::new(StatusCode::BAD_GATEWAY, e.user_message())),
    }
}

async fn list_reports(State(state): State<AppState>) -> Json<JsonResponse<Vec<IntelligenceReport>>> {
    Json(JsonResponse::ok(state.sessions.history().list()))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
) -> AppResult<Json<JsonResponse<IntelligenceReport>>> {
    let report = state
        .sessions
        .history()
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("Report {}", id)))?;
    Ok(Json(JsonResponse::ok(report)))
}
