use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use execplan_core::{PlanError, PlanningService, SubtaskGeneration, TaskCompletion};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        let status = match &err {
            PlanError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            PlanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status,
            message: format!("{err:#}"),
        }
    }
}

// Extractor rejections keep axum's status and message.
macro_rules! from_rejection {
    ($($rejection:ty),+) => {$(
        impl From<$rejection> for AppError {
            fn from(rejection: $rejection) -> Self {
                Self {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        }
    )+};
}

from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleQuery {
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskQuery {
    pub time_spent: i64,
    #[serde(default)]
    pub problems: Option<String>,
    #[serde(default)]
    pub insights: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: PlanningService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/goals", post(create_goal).get(list_goals))
        .route("/goals/{id}", get(get_goal).delete(delete_goal))
        .route("/tasks/{id}", put(complete_task))
        .route("/tasks/{id}/generate_subtasks", post(generate_subtasks))
        .route("/subtasks/{id}", put(toggle_subtask))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: PlanningService, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("execplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("execplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_goal(
    State(service): State<PlanningService>,
    req: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = req?;
    let goal = service
        .create_goal(&req.title, req.model_name.as_deref())
        .await?;
    Ok(Json(goal).into_response())
}

async fn list_goals(
    State(service): State<PlanningService>,
) -> Result<axum::response::Response, AppError> {
    let goals = service.list_goals().await?;
    Ok(Json(goals).into_response())
}

async fn get_goal(
    State(service): State<PlanningService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<axum::response::Response, AppError> {
    let Path(id) = id?;
    let goal = service.get_goal(id).await?;
    Ok(Json(goal).into_response())
}

async fn delete_goal(
    State(service): State<PlanningService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<axum::response::Response, AppError> {
    let Path(id) = id?;
    service.delete_goal(id).await?;
    Ok(Json(json!({ "message": format!("Goal {id} deleted") })).into_response())
}

async fn generate_subtasks(
    State(service): State<PlanningService>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ModelQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let (Path(id), Query(query)) = (id?, query?);
    let body = match service
        .generate_subtasks(id, query.model_name.as_deref())
        .await?
    {
        SubtaskGeneration::Generated(subtasks) => json!({
            "message": format!("Generated {} subtasks for task {id}", subtasks.len()),
            "generated": subtasks.len(),
        }),
        SubtaskGeneration::AlreadyPresent(existing) => json!({
            "message": format!("Task {id} already has {existing} subtasks"),
            "generated": 0,
        }),
    };
    Ok(Json(body).into_response())
}

async fn toggle_subtask(
    State(service): State<PlanningService>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ToggleQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let (Path(id), Query(query)) = (id?, query?);
    service.toggle_subtask(id, query.is_completed).await?;
    Ok(Json(json!({ "status": "updated" })).into_response())
}

async fn complete_task(
    State(service): State<PlanningService>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<CompleteTaskQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let (Path(id), Query(query)) = (id?, query?);
    let completion = TaskCompletion {
        time_spent: query.time_spent,
        problems: query.problems,
        insights: query.insights,
    };
    let task = service.complete_task(id, completion).await?;
    Ok(Json(json!({
        "message": format!("Task {id} completed"),
        "task": task,
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
