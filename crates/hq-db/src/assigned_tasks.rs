//! Assigned-task repository.
//!
//! Assigned tasks are pushed to a zone/branch and tracked to completion by
//! the receiving branch.

use chrono::{DateTime, Utc};
use hq_core::types::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Assigned-task database entity
#[derive(Debug, Clone, FromRow)]
pub struct AssignedTaskRow {
    pub id: i64,
    pub task_name: String,
    pub date: String,
    pub deadline: DateTime<Utc>,
    pub zone: String,
    pub branch: String,
    pub completed: bool,
}

/// DTO for creating an assigned task
#[derive(Debug, Clone)]
pub struct CreateAssignedTaskDto {
    pub task_name: String,
    pub date: String,
    pub deadline: DateTime<Utc>,
    pub zone: String,
    pub branch: String,
}

const ASSIGNED_TASK_COLUMNS: &str = "id, task_name, date, deadline, zone, branch, completed";

/// Assigned-task repository implementation
pub struct AssignedTaskRepository {
    pool: PgPool,
}

impl AssignedTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateAssignedTaskDto) -> RepositoryResult<AssignedTaskRow> {
        let row = sqlx::query_as::<_, AssignedTaskRow>(&format!(
            r#"
            INSERT INTO assigned_tasks (task_name, date, deadline, zone, branch)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSIGNED_TASK_COLUMNS}
            "#
        ))
        .bind(&dto.task_name)
        .bind(&dto.date)
        .bind(dto.deadline)
        .bind(&dto.zone)
        .bind(&dto.branch)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Tasks assigned to a zone/branch, optionally filtered by completion
    pub async fn find_for_branch(
        &self,
        zone: &str,
        branch: &str,
        completed: Option<bool>,
    ) -> RepositoryResult<Vec<AssignedTaskRow>> {
        let rows = sqlx::query_as::<_, AssignedTaskRow>(&format!(
            r#"
            SELECT {ASSIGNED_TASK_COLUMNS} FROM assigned_tasks
            WHERE zone = $1 AND branch = $2
              AND ($3::BOOLEAN IS NULL OR completed = $3)
            ORDER BY id
            "#
        ))
        .bind(zone)
        .bind(branch)
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Mark an assigned task as completed
    pub async fn mark_completed(&self, id: Id) -> RepositoryResult<AssignedTaskRow> {
        let row = sqlx::query_as::<_, AssignedTaskRow>(&format!(
            "UPDATE assigned_tasks SET completed = TRUE WHERE id = $1 \
             RETURNING {ASSIGNED_TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Assigned task {} not found", id)))?;

        Ok(row)
    }
}
