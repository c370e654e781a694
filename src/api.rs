// src/api.rs
//! Thin HTTP surface over the pipeline and the assistant.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::assistant::{Assistant, ChatMessage};
use crate::config::AppConfig;
use crate::error::{AssistantError, PipelineError};
use crate::fetch::HttpTransport;
use crate::identity::normalize_identifier;
use crate::pipeline::{MultiReport, Pipeline, SingleReport};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(cfg: &AppConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(cfg, transport.clone())),
            assistant: Arc::new(Assistant::new(&cfg.assistant, transport)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/analyze", post(analyze))
        .route("/api/analyze-all", post(analyze_all))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct AnalyzeReq {
    #[serde(default, alias = "username")]
    identifier: Option<String>,
}

impl AnalyzeReq {
    fn identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct ChatReq {
    #[serde(default, alias = "username")]
    identifier: Option<String>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatResp {
    reply: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<SingleReport>, ApiError> {
    Ok(Json(state.pipeline.analyze_single(body.identifier()).await?))
}

async fn analyze_all(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<MultiReport>, ApiError> {
    Ok(Json(state.pipeline.analyze_all(body.identifier()).await?))
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatReq>,
) -> Result<Json<ChatResp>, ApiError> {
    if !state.assistant.is_configured() {
        return Err(AssistantError::MissingCredential(crate::assistant::API_KEY_VAR).into());
    }
    let context = match body.identifier.as_deref().and_then(normalize_identifier) {
        Some(id) => state.pipeline.collect_context(&id).await?,
        None => Vec::new(),
    };
    let reply = state.assistant.reply(&body.messages, &context).await?;
    info!(target: "api", turns = body.messages.len(), context = context.len(), "chat answered");
    Ok(Json(ChatResp { reply }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::Pipeline(PipelineError::MissingIdentifier) => {
                (StatusCode::BAD_REQUEST, "request")
            }
            ApiError::Assistant(AssistantError::MissingCredential(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "configuration")
            }
            ApiError::Assistant(AssistantError::Upstream(_)) => (StatusCode::BAD_GATEWAY, "upstream"),
        };
        warn!(target: "api", status = status.as_u16(), kind, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string(), "kind": kind }))).into_response()
    }
}
