use std::net::TcpListener;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::FarmhandAgent;
use crate::error::{ToolError, TurnError};
use crate::models::{AdvisoryRequest, ChatRequest, DiagnosisRequest};

pub struct RouterState {
  pub started_at: Instant,
  pub agent: FarmhandAgent,
}

pub fn build_router(state: RouterState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/v1/chat", post(chat))
    .route("/v1/diagnose", post(diagnose))
    .route("/v1/advisory", post(advisory))
    .route("/v1/tools", get(list_tools))
    .route("/v1/tools/:name", post(invoke_tool))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .with_state(Arc::new(state))
}

pub async fn run_router(listener: TcpListener, state: RouterState) -> anyhow::Result<()> {
  listener.set_nonblocking(true)?;
  let listener = tokio::net::TcpListener::from_std(listener)?;
  axum::serve(listener, build_router(state)).await?;
  Ok(())
}

async fn health(State(state): State<Arc<RouterState>>) -> Json<serde_json::Value> {
  let uptime = state.started_at.elapsed().as_millis();
  Json(serde_json::json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
    "uptime_ms": uptime
  }))
}

async fn chat(State(state): State<Arc<RouterState>>, Json(req): Json<ChatRequest>) -> Response {
  match state.agent.chat(req).await {
    Ok(res) => (StatusCode::OK, Json(res)).into_response(),
    Err(err) => turn_error_response(&err),
  }
}

async fn diagnose(State(state): State<Arc<RouterState>>, Json(req): Json<DiagnosisRequest>) -> Response {
  match state.agent.diagnose(req).await {
    Ok(res) => (StatusCode::OK, Json(res)).into_response(),
    Err(err) => turn_error_response(&err),
  }
}

async fn advisory(State(state): State<Arc<RouterState>>, Json(req): Json<AdvisoryRequest>) -> Response {
  match state.agent.proactive_advisory(req).await {
    Ok(res) => (StatusCode::OK, Json(res)).into_response(),
    Err(err) => turn_error_response(&err),
  }
}

async fn list_tools(State(state): State<Arc<RouterState>>) -> Response {
  Json(state.agent.tools().definitions()).into_response()
}

async fn invoke_tool(
  State(state): State<Arc<RouterState>>,
  Path(name): Path<String>,
  Json(input): Json<serde_json::Value>,
) -> Response {
  match state.agent.tools().invoke(&name, input) {
    Ok(output) => (StatusCode::OK, Json(output)).into_response(),
    Err(err) => tool_error_response(&err),
  }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
  let body = Json(serde_json::json!({ "error": message, "code": code }));
  (status, body).into_response()
}

fn turn_error_response(err: &TurnError) -> Response {
  let (status, code) = match err {
    TurnError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
    TurnError::MalformedResponse => (StatusCode::INTERNAL_SERVER_ERROR, "malformed_response"),
    TurnError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
  };
  error_response(status, code, &err.to_string())
}

fn tool_error_response(err: &ToolError) -> Response {
  let (status, code) = match err {
    ToolError::UnknownTool(_) => (StatusCode::NOT_FOUND, "unknown_tool"),
    ToolError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
    ToolError::InvalidOutput { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_output"),
  };
  error_response(status, code, &err.to_string())
}
