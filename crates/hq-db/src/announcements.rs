//! Announcement repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

/// Announcement database entity
#[derive(Debug, Clone, FromRow)]
pub struct AnnouncementRow {
    pub id: i64,
    pub announcement: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating an announcement
#[derive(Debug, Clone)]
pub struct CreateAnnouncementDto {
    pub announcement: String,
    pub created_by: String,
}

const ANNOUNCEMENT_COLUMNS: &str = "id, announcement, created_by, created_at";

/// Announcement repository implementation
pub struct AnnouncementRepository {
    pool: PgPool,
}

impl AnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateAnnouncementDto) -> RepositoryResult<AnnouncementRow> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            INSERT INTO announcements (announcement, created_by)
            VALUES ($1, $2)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(&dto.announcement)
        .bind(&dto.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<AnnouncementRow>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recently created announcement, if any
    pub async fn latest(&self) -> RepositoryResult<Option<AnnouncementRow>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
