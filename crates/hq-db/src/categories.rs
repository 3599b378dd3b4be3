//! Cylinder category repository.
//!
//! Categories pair a name with a weight label such as "6 kg" or
//! "5-10 Litre".

use async_trait::async_trait;
use hq_core::types::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Category database entity
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub weight: String,
}

/// DTO for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategoryDto {
    pub name: String,
    pub weight: String,
}

/// DTO for updating a category
#[derive(Debug, Clone)]
pub struct UpdateCategoryDto {
    pub name: String,
    pub weight: String,
}

/// Category repository implementation
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<CategoryRow, CreateCategoryDto, UpdateCategoryDto> for CategoryRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, weight FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, weight FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateCategoryDto) -> RepositoryResult<CategoryRow> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, weight) VALUES ($1, $2) RETURNING id, name, weight",
        )
        .bind(&dto.name)
        .bind(&dto.weight)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateCategoryDto) -> RepositoryResult<CategoryRow> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = $2, weight = $3 WHERE id = $1 \
             RETURNING id, name, weight",
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.weight)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Category {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Category {} not found",
                id
            )));
        }

        Ok(())
    }
}
