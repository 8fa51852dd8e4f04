use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::task::{
    CreateTask, CreateTaskStage, Task, TaskStage, TaskStatusChange, TaskWithContext, UpdateTask,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// The dashboard kanban/list never pages beyond this.
const TASK_LIST_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskListParams {
    pub status: Option<String>,
}

/// Detail shape: the task plus its stages and status history.
#[derive(Debug, Serialize, TS)]
pub struct TaskDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: TaskWithContext,
    pub stages: Vec<TaskStage>,
    pub history: Vec<TaskStatusChange>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithContext>>>, ApiError> {
    let tasks = Task::find_all(&state.db.pool, params.status.as_deref(), TASK_LIST_LIMIT).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    let task = Task::create(&state.db.pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(task))))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<TaskDetail>>, ApiError> {
    let task = Task::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("tarefa"))?;
    let stages = TaskStage::find_by_task_id(&state.db.pool, id).await?;
    let history = TaskStatusChange::find_by_task_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(TaskDetail {
        task,
        stages,
        history,
    })))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Task::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("tarefa"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn list_stages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskStage>>>, ApiError> {
    let stages = TaskStage::find_by_task_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(stages)))
}

pub async fn create_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateTaskStage>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<TaskStage>>), ApiError> {
    // Reject stages for tasks that do not exist.
    Task::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("tarefa"))?;
    let stage = TaskStage::create(&state.db.pool, id, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(stage))))
}

pub async fn list_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskStatusChange>>>, ApiError> {
    let history = TaskStatusChange::find_by_task_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(history)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(list_tasks).post(create_task))
            .route("/{id}", get(get_task).put(update_task).delete(delete_task))
            .route("/{id}/stages", get(list_stages).post(create_stage))
            .route("/{id}/history", get(list_history)),
    )
}
