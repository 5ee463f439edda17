//! HTTP boundary: `POST /analyze`, `POST /ask` and `GET /health`.
//!
//! Every response uses the `{success, data | response | error}` envelope.
//! Each analysis builds its own engine, so requests share nothing mutable.

use crate::analyzer::report::AnalysisReport;
use crate::analyzer::Engine;
use crate::assistant::Assistant;
use crate::config::SiteLensConfig;
use crate::error::AnalysisError;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Read-only state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub seed: Option<u64>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(seed: Option<u64>, assistant: Assistant) -> Self {
        Self {
            seed,
            assistant: Arc::new(assistant),
        }
    }

    pub fn from_config(config: &SiteLensConfig) -> Self {
        Self::new(
            config.analysis.seed,
            Assistant::from_settings(&config.assistant),
        )
    }

    fn engine(&self) -> Engine {
        match self.seed {
            Some(seed) => Engine::seeded(seed),
            None => Engine::new(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route("/ask", post(ask_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &SiteLensConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let app = create_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    tracing::info!(addr = %addr, "sitelens server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "sitelens",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Parse a JSON body; an empty body counts as empty input.
fn parse_body(body: &Bytes) -> Result<Value, AnalysisError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AnalysisError::EmptyInput);
    }
    Ok(serde_json::from_slice(body)?)
}

async fn analyze_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let result = parse_body(&body).and_then(|data| state.engine().analyze(&data));

    match result {
        Ok(report) => Json(json!({ "success": true, "data": report })).into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if err.is_client_error() {
                tracing::debug!(error = %err, "rejected analysis request");
            } else {
                tracing::error!(error = %err, "error analyzing project data");
            }
            failure(status, err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    analysis: Option<AnalysisReport>,
}

async fn ask_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: AskRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return failure(StatusCode::BAD_REQUEST, format!("Invalid request: {}", err));
        }
    };

    let query = match request.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => query,
        _ => return failure(StatusCode::BAD_REQUEST, "No query provided"),
    };

    let reply = state
        .assistant
        .answer(query, request.analysis.as_ref())
        .await;
    Json(json!({ "success": true, "response": reply })).into_response()
}
