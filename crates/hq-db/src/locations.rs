//! Cylinder location repository.

use async_trait::async_trait;
use hq_core::types::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Location database entity
#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub name: String,
}

/// DTO for creating a location
#[derive(Debug, Clone)]
pub struct CreateLocationDto {
    pub name: String,
}

/// DTO for updating a location
#[derive(Debug, Clone)]
pub struct UpdateLocationDto {
    pub name: String,
}

/// Location repository implementation
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<LocationRow, CreateLocationDto, UpdateLocationDto> for LocationRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<LocationRow>> {
        let row = sqlx::query_as::<_, LocationRow>("SELECT id, name FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<LocationRow>> {
        let rows = sqlx::query_as::<_, LocationRow>("SELECT id, name FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateLocationDto) -> RepositoryResult<LocationRow> {
        let row = sqlx::query_as::<_, LocationRow>(
            "INSERT INTO locations (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("Location {} already exists", dto.name))
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateLocationDto) -> RepositoryResult<LocationRow> {
        let row = sqlx::query_as::<_, LocationRow>(
            "UPDATE locations SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&dto.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Location {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Location {} not found",
                id
            )));
        }

        Ok(())
    }
}
