//! HTTP transport for decision-lab
//!
//! `POST /api/analyze` runs the analysis pipeline, `POST /api/events` logs
//! client page events, `GET /health` is a plain liveness probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::{DecisionLabError, Result};
use crate::events::{ClientEvent, log_client_event};
use crate::orchestrator::{Analyzer, build_analyzer, input_is_long_enough};
use crate::schemas::AnalysisResponse;

pub const ERR_TEXT_TOO_SHORT: &str = "텍스트가 너무 짧습니다.";
pub const ERR_API_CONFIG: &str = "API 설정 오류";
pub const ERR_ANALYSIS: &str = "분석 중 오류가 발생했습니다.";

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    /// Absent when no model credential is configured
    pub analyzer: Option<Arc<dyn Analyzer>>,
}

impl HttpState {
    pub fn new(config: Config, analyzer: Option<Arc<dyn Analyzer>>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }

    /// State wired to the production model client
    pub fn from_config(config: Config) -> Result<Self> {
        let analyzer = build_analyzer(&config)?;
        Ok(Self::new(config, analyzer))
    }
}

impl IntoResponse for DecisionLabError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_body())).into_response()
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Analysis endpoint
pub async fn analyze_handler(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Analysis error: {}", e);
        DecisionLabError::Internal {
            message: ERR_ANALYSIS.to_string(),
        }
    })?;

    let text = payload
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| input_is_long_enough(t, state.config.analysis.min_input_chars))
        .ok_or_else(|| DecisionLabError::InvalidParams {
            message: ERR_TEXT_TOO_SHORT.to_string(),
        })?;

    let analyzer = state.analyzer.as_ref().ok_or_else(|| {
        tracing::error!("OPENAI_API_KEY not configured");
        DecisionLabError::Config {
            message: ERR_API_CONFIG.to_string(),
        }
    })?;

    let result = analyzer.analyze(text).await;
    Ok(Json(AnalysisResponse::ok(result)))
}

/// Client event log endpoint
pub async fn events_handler(body: Bytes) -> Response {
    match serde_json::from_slice::<ClientEvent>(&body) {
        Ok(event) => {
            log_client_event(&event);
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(e) => {
            tracing::error!("[Event Error] {}", e);
            (StatusCode::BAD_REQUEST, Json(json!({ "success": false }))).into_response()
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/events", post(events_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: HttpState) -> Result<()> {
    let bind = state.config.runtime.http_bind;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| DecisionLabError::Config {
            message: format!("Failed to bind {}: {}", bind, e),
        })?;
    tracing::info!("decision-lab listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| DecisionLabError::Internal {
            message: format!("HTTP server error: {}", e),
        })
}
