use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::agent::{AgentFactory, AgentRequest};
use crate::error::{AgentError, StoreError};
use crate::history_store::HistoryEntry;
use crate::pipeline::PipelineInput;
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn agent_failure(err: AgentError) -> ApiError {
    error!(agent = %err.agent(), "Agent failed: {}", err);
    api_error(StatusCode::BAD_GATEWAY, err.to_string())
}

fn store_failure(err: StoreError) -> ApiError {
    error!("Store failure: {}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub symptoms: String,
    #[serde(default)]
    pub report: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.config.llm_config.model,
        "provider": state.config.llm_config.llm_provider,
    }))
}

/// Pool size and how many keys are currently usable. Never exposes keys.
pub async fn key_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "total": state.key_pool.len(),
        "available": state.key_pool.available_count(),
    }))
}

/// Run the full agent pipeline and record the result in the user's history
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.symptoms.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "symptoms are required"));
    }

    let input = PipelineInput {
        symptoms: payload.symptoms.clone(),
        report: payload.report.clone(),
    };
    let report = state.pipeline.run(input).await.map_err(agent_failure)?;

    if let Some(user_id) = payload.user_id.as_deref().filter(|id| !id.is_empty()) {
        let entry = HistoryEntry::from_report(&payload.symptoms, payload.report.as_deref(), &report);
        state.history.append(user_id, entry).map_err(store_failure)?;
        info!(user_id, run_id = %report.run_id, "Stored pipeline result");
    }

    Ok(Json(json!(report)))
}

/// Run one agent on its own, against an empty transcript
pub async fn run_single_agent(
    State(state): State<AppState>,
    Path(agent): Path<String>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<Value>, ApiError> {
    let agent = AgentFactory::create_agent(&agent)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))?;
    if request.symptoms.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "symptoms are required"));
    }

    let ctx = state.pipeline.context().fresh_run();
    let text = agent.run(&ctx, &request).await.map_err(agent_failure)?;
    Ok(Json(json!({
        "agent": agent.kind(),
        "text": text,
    })))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    Json(json!(state.history.fetch(&user_id)))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "username and password are required",
        ));
    }

    let created = state
        .users
        .create_user(payload.username.trim(), &payload.password, &payload.full_name)
        .map_err(store_failure)?;
    if !created {
        return Err(api_error(StatusCode::CONFLICT, "username already exists"));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "username": payload.username.trim() })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    match state.users.check_credentials(&payload.username, &payload.password) {
        Some(profile) => Ok(Json(json!(profile))),
        None => {
            warn!("Failed login for {}", payload.username);
            Err(api_error(StatusCode::UNAUTHORIZED, "invalid credentials"))
        }
    }
}
