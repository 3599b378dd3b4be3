//! Task handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use hq_core::types::{Id, ZoneFilter};
use hq_db::{CreateTaskDto, Repository, TaskRepository, TaskRow, UpdateTaskDto};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

/// Add a new task
///
/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(dto): Json<TaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let dto = dto.validated()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let task = repo.create(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskMessageResponse {
            message: "Task added successfully".into(),
            task: TaskResponse::from_row(task),
        }),
    ))
}

/// List tasks, optionally narrowed by zone and branch
///
/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = ZoneFilter::new(query.zone, query.branch);

    let repo = TaskRepository::new(state.pool()?.clone());
    let tasks = repo.find_filtered(&filter).await?;

    let tasks: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from_row).collect();
    Ok(Json(tasks))
}

/// Get a task by ID
///
/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = TaskRepository::new(state.pool()?.clone());
    let task = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    Ok(Json(TaskResponse::from_row(task)))
}

/// Update a task
///
/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<TaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let dto = dto.validated()?;

    let repo = TaskRepository::new(state.pool()?.clone());
    let task = repo
        .update(
            id,
            UpdateTaskDto {
                task_name: dto.task_name,
                date: dto.date,
                deadline: dto.deadline,
                zone: dto.zone,
                branch: dto.branch,
            },
        )
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Task not found"),
            other => other.into(),
        })?;

    Ok(Json(TaskMessageResponse {
        message: "Task updated successfully".into(),
        task: TaskResponse::from_row(task),
    }))
}

/// Delete a task
///
/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = TaskRepository::new(state.pool()?.clone());
    repo.delete(id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Task not found"),
        other => other.into(),
    })?;

    Ok(Json(Message::new("Task deleted successfully")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

impl TaskRequest {
    fn validated(self) -> ApiResult<CreateTaskDto> {
        if !(present(&self.task_name)
            && present(&self.date)
            && self.deadline.is_some()
            && present(&self.zone)
            && present(&self.branch))
        {
            return Err(ApiError::bad_request("All fields are required"));
        }

        Ok(CreateTaskDto {
            task_name: self.task_name.unwrap(),
            date: self.date.unwrap(),
            deadline: self.deadline.unwrap(),
            zone: self.zone.unwrap(),
            branch: self.branch.unwrap(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub zone: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Id,
    pub task_name: String,
    pub date: String,
    pub deadline: String,
    pub zone: String,
    pub branch: String,
}

impl TaskResponse {
    pub fn from_row(row: TaskRow) -> Self {
        Self {
            id: row.id,
            task_name: row.task_name,
            date: row.date,
            deadline: row.deadline.to_rfc3339(),
            zone: row.zone,
            branch: row.branch,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskMessageResponse {
    pub message: String,
    pub task: TaskResponse,
}
