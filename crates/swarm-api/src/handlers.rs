//! API Handlers
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use swarm_core::SWARM_VERSION;

use crate::session::ChatSession;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub input: String,
    #[serde(default)]
    pub session: Option<ChatSession>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub share: bool,
    pub session: ChatSession,
}

pub async fn run(State(state): State<AppState>, Json(payload): Json<RunRequest>) -> Response {
    match state.pipeline.run(&payload.input).await {
        Ok(output) => {
            state.metrics.record_run("run", true);
            (StatusCode::OK, Json(output)).into_response()
        }
        Err(failure) => {
            state.metrics.record_run("run", false);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": failure.to_string(),
                    "stage_id": failure.stage_id,
                    "position": failure.position,
                    "loop_index": failure.loop_index,
                    "cause": failure.cause.to_string(),
                })),
            )
                .into_response()
        }
    }
}

pub async fn chat(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> Response {
    if payload.input.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "input must not be empty" })),
        )
            .into_response();
    }

    let session = payload.session.unwrap_or_default();
    let outcome = session.turn(&payload.input, &state.pipeline).await;
    state.metrics.record_run("chat", outcome.ok);

    (
        StatusCode::OK,
        Json(ChatResponse {
            reply: outcome.reply,
            share: outcome.share,
            session: outcome.session,
        }),
    )
        .into_response()
}

pub async fn describe_pipeline(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "pipeline_id": state.pipeline.pipeline_id(),
            "stages": state.pipeline.stage_ids(),
            "max_loops": state.pipeline.max_loops(),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": SWARM_VERSION })))
}
