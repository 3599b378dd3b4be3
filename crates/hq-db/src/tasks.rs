//! Task repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hq_core::types::{Id, ZoneFilter};
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Task database entity
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub task_name: String,
    /// Display date string as entered by the creator
    pub date: String,
    pub deadline: DateTime<Utc>,
    pub zone: String,
    pub branch: String,
}

impl TaskRow {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }
}

/// DTO for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskDto {
    pub task_name: String,
    pub date: String,
    pub deadline: DateTime<Utc>,
    pub zone: String,
    pub branch: String,
}

/// DTO for updating a task
#[derive(Debug, Clone)]
pub struct UpdateTaskDto {
    pub task_name: String,
    pub date: String,
    pub deadline: DateTime<Utc>,
    pub zone: String,
    pub branch: String,
}

const TASK_COLUMNS: &str = "id, task_name, date, deadline, zone, branch";

/// Task repository implementation
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find tasks, optionally narrowed by zone and branch
    pub async fn find_filtered(&self, filter: &ZoneFilter) -> RepositoryResult<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE ($1::TEXT IS NULL OR zone = $1)
              AND ($2::TEXT IS NULL OR branch = $2)
            ORDER BY id
            "#
        ))
        .bind(&filter.zone)
        .bind(&filter.branch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl Repository<TaskRow, CreateTaskDto, UpdateTaskDto> for TaskRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateTaskDto) -> RepositoryResult<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (task_name, date, deadline, zone, branch)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
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

    async fn update(&self, id: Id, dto: UpdateTaskDto) -> RepositoryResult<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET task_name = $2, date = $3, deadline = $4, zone = $5, branch = $6
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.task_name)
        .bind(&dto.date)
        .bind(dto.deadline)
        .bind(&dto.zone)
        .bind(&dto.branch)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Task {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Task {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let task = TaskRow {
            id: 1,
            task_name: "Deep clean fryers".into(),
            date: "2026-08-01".into(),
            deadline: now - Duration::hours(2),
            zone: "Zone A".into(),
            branch: "Headquarters".into(),
        };

        assert!(task.is_overdue(now));
        assert!(!task.is_overdue(now - Duration::hours(3)));
    }
}
