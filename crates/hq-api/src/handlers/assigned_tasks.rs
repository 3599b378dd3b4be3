//! Assigned-task handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use hq_core::types::Id;
use hq_db::{AssignedTaskRepository, AssignedTaskRow, CreateAssignedTaskDto};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

/// Add a new assigned task
///
/// POST /api/assignedTasks
pub async fn create_assigned_task(
    State(state): State<AppState>,
    Json(dto): Json<AssignedTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.task_name)
        && present(&dto.date)
        && dto.deadline.is_some()
        && present(&dto.zone)
        && present(&dto.branch))
    {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let repo = AssignedTaskRepository::new(state.pool()?.clone());
    let task = repo
        .create(CreateAssignedTaskDto {
            task_name: dto.task_name.unwrap(),
            date: dto.date.unwrap(),
            deadline: dto.deadline.unwrap(),
            zone: dto.zone.unwrap(),
            branch: dto.branch.unwrap(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignedTaskMessageResponse {
            message: "Assigned task added successfully".into(),
            task: AssignedTaskResponse::from_row(task),
        }),
    ))
}

/// Assigned tasks for the caller's zone and branch
///
/// GET /api/user/assignedTasks
pub async fn list_user_assigned_tasks(
    State(state): State<AppState>,
    Query(query): Query<AssignedTaskListQuery>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&query.zone) && present(&query.branch)) {
        return Err(ApiError::bad_request("Zone and branch are required"));
    }

    // Absent or unrecognized values mean "both"
    let completed = match query.completed.as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    };

    let repo = AssignedTaskRepository::new(state.pool()?.clone());
    let tasks = repo
        .find_for_branch(
            query.zone.as_deref().unwrap(),
            query.branch.as_deref().unwrap(),
            completed,
        )
        .await?;

    let tasks: Vec<AssignedTaskResponse> = tasks
        .into_iter()
        .map(AssignedTaskResponse::from_row)
        .collect();
    Ok(Json(tasks))
}

/// Mark an assigned task as completed
///
/// PATCH /api/assignedTasks/:task_id/complete
pub async fn complete_assigned_task(
    State(state): State<AppState>,
    Path(task_id): Path<Id>,
    Json(dto): Json<CompleteTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.branch) {
        return Err(ApiError::bad_request("Branch is required"));
    }

    let repo = AssignedTaskRepository::new(state.pool()?.clone());
    repo.mark_completed(task_id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Assigned task not found"),
        other => other.into(),
    })?;

    Ok(Json(Message::new("Assigned task marked as completed")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTaskRequest {
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignedTaskListQuery {
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub completed: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTaskResponse {
    pub id: Id,
    pub task_name: String,
    pub date: String,
    pub deadline: String,
    pub zone: String,
    pub branch: String,
    pub completed: bool,
}

impl AssignedTaskResponse {
    pub fn from_row(row: AssignedTaskRow) -> Self {
        Self {
            id: row.id,
            task_name: row.task_name,
            date: row.date,
            deadline: row.deadline.to_rfc3339(),
            zone: row.zone,
            branch: row.branch,
            completed: row.completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignedTaskMessageResponse {
    pub message: String,
    pub task: AssignedTaskResponse,
}
