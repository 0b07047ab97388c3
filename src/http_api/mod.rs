use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::calendar;
use crate::conflicts::{self, ConflictInfo, ConflictPair, ProjectTask};
use crate::snapshot::{SnapshotError, TaskRecord, tasks_from_records};
use crate::task_validation;
use crate::{
    CriticalPathResult, DateChange, DateRange, EngineConfig, ScheduleError, ScheduleSummary, Task,
    TaskId, cascade_changes, calculate_critical_path_detailed, validate_dependency_no_cycle,
};

/// Router state. Requests carry their own task snapshots; only the
/// configuration is shared.
#[derive(Clone, Default)]
pub struct AppState {
    config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn tasks(&self, records: Vec<TaskRecord>) -> Result<Vec<Task>, ApiError> {
        tasks_from_records(records, &self.config).map_err(ApiError::from)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unprocessable(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::UnknownTask(_) => ApiError::NotFound(value.to_string()),
            ScheduleError::DependencyCycle { .. } => ApiError::Unprocessable(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(value: SnapshotError) -> Self {
        match value {
            SnapshotError::Schedule(err) => ApiError::from(err),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CriticalPathRequest {
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CriticalPathResponse {
    pub summary: ScheduleSummary,
    pub result: CriticalPathResult,
}

#[derive(Debug, Deserialize)]
pub struct CascadeRequest {
    pub changed_task_id: TaskId,
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CascadeResponse {
    pub updates: HashMap<TaskId, DateRange>,
    pub changes: Vec<DateChange>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateDependencyRequest {
    pub predecessor_id: TaskId,
    pub successor_id: TaskId,
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckRequest {
    pub employee_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub exclude_task_id: Option<TaskId>,
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicts: Vec<ConflictInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectTaskRecord {
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(flatten)]
    pub task: TaskRecord,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeConflictRequest {
    pub employee_id: String,
    pub tasks: Vec<ProjectTaskRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/critical-path", post(critical_path))
        .route("/cascade", post(cascade))
        .route("/dependencies/validate", post(validate_dependency))
        .route("/conflicts", post(check_conflicts))
        .route("/conflicts/employee", post(employee_conflicts))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: EngineConfig) -> std::io::Result<()> {
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "schedule-engine HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn critical_path(
    State(state): State<AppState>,
    Json(payload): Json<CriticalPathRequest>,
) -> Result<Json<CriticalPathResponse>, ApiError> {
    let tasks = state.tasks(payload.tasks)?;
    let result = calculate_critical_path_detailed(&tasks);
    Ok(Json(CriticalPathResponse {
        summary: result.summary(),
        result,
    }))
}

async fn cascade(
    State(state): State<AppState>,
    Json(payload): Json<CascadeRequest>,
) -> Result<Json<CascadeResponse>, ApiError> {
    let tasks = state.tasks(payload.tasks)?;
    if !tasks.iter().any(|task| task.id == payload.changed_task_id) {
        return Err(ApiError::not_found(format!(
            "task {} not found",
            payload.changed_task_id
        )));
    }
    let changes = cascade_changes(&payload.changed_task_id, &tasks);
    let updates = changes
        .iter()
        .map(|change| (change.task_id.clone(), change.updated))
        .collect();
    Ok(Json(CascadeResponse { updates, changes }))
}

async fn validate_dependency(
    State(state): State<AppState>,
    Json(payload): Json<ValidateDependencyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tasks = state.tasks(payload.tasks)?;
    let valid =
        validate_dependency_no_cycle(&payload.predecessor_id, &payload.successor_id, &tasks);
    Ok(Json(json!({ "valid": valid })))
}

async fn check_conflicts(
    State(state): State<AppState>,
    Json(payload): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, ApiError> {
    let start = calendar::parse_date(&payload.start_date).map_err(ScheduleError::from)?;
    let end = calendar::parse_date(&payload.end_date).map_err(ScheduleError::from)?;
    if start > end {
        return Err(ApiError::invalid(format!(
            "start_date {start} is after end_date {end}"
        )));
    }
    let tasks = state.tasks(payload.tasks)?;
    let conflicts = conflicts::detect_employee_conflicts(
        &payload.employee_id,
        start,
        end,
        &tasks,
        payload.exclude_task_id.as_deref(),
    );
    Ok(Json(ConflictCheckResponse {
        has_conflict: !conflicts.is_empty(),
        conflicts,
    }))
}

async fn employee_conflicts(
    State(state): State<AppState>,
    Json(payload): Json<EmployeeConflictRequest>,
) -> Result<Json<Vec<ConflictPair>>, ApiError> {
    let mut entries = Vec::with_capacity(payload.tasks.len());
    for record in payload.tasks {
        let task = record.task.into_task(&state.config)?;
        entries.push(ProjectTask::new(record.project_id, record.project_name, task));
    }
    if state.config.validate_snapshots {
        task_validation::validate_all(entries.iter().map(|entry| &entry.task))
            .map_err(ScheduleError::from)?;
    }

    let limit = state.config.max_conflict_scan_tasks;
    let assigned = entries
        .iter()
        .filter(|entry| entry.task.is_assigned_to(&payload.employee_id))
        .count();
    if assigned > limit {
        return Err(ApiError::invalid(format!(
            "conflict scan limited to {limit} tasks, {} has {assigned}",
            payload.employee_id
        )));
    }
    Ok(Json(conflicts::get_all_employee_conflicts(
        &payload.employee_id,
        &entries,
    )))
}
