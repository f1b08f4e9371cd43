// REST API endpoints for the orchestrator

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use crate::model::TaskExecution;
use crate::orchestrator::Orchestrator;

pub type AppState = Arc<Orchestrator>;

/// Body of `POST /api/v1/tasks/execute`.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task: String,
    /// Reserved for additional task context; currently unused.
    #[serde(default)]
    pub context: Option<Value>,
}

/// Acknowledgement returned when a task is accepted.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: String,
    pub message: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/tasks/execute", post(start_task_execution))
        .route("/api/v1/tasks/status/{task_id}", get(get_task_status))
        .route("/api/v1/tasks/executions", get(list_task_executions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// Start execution of a task in the background and return its id.
///
/// The execution record is registered before this handler returns, so a
/// status poll issued immediately afterwards will find it.
async fn start_task_execution(
    State(state): State<AppState>,
    Json(payload): Json<TaskRequest>,
) -> Result<Json<TaskResponse>, StatusCode> {
    if payload.task.trim().is_empty() {
        error!("task is required but was not provided");
        return Err(StatusCode::BAD_REQUEST);
    }

    let task_id = Uuid::new_v4().to_string();
    state.spawn_task(task_id.clone(), payload.task).await;

    Ok(Json(TaskResponse {
        task_id,
        status: "pending".to_string(),
        message: "Task execution started".to_string(),
    }))
}

/// Poll the current state of one task execution.
async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskExecution>, StatusCode> {
    match state.get_execution(&task_id).await {
        Some(execution) => Ok(Json(execution)),
        None => {
            error!(task_id, "task execution not found");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// List every tracked execution, including in-progress ones.
async fn list_task_executions(
    State(state): State<AppState>,
) -> Json<HashMap<String, TaskExecution>> {
    Json(state.list_executions().await)
}
