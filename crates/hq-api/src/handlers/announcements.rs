//! Announcement handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hq_core::types::Id;
use hq_db::{AnnouncementRepository, AnnouncementRow, CreateAnnouncementDto};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::present;

/// Post a new announcement
///
/// POST /api/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(dto): Json<CreateAnnouncementRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.announcement) && present(&dto.created_by)) {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let repo = AnnouncementRepository::new(state.pool()?.clone());
    let announcement = repo
        .create(CreateAnnouncementDto {
            announcement: dto.announcement.unwrap(),
            created_by: dto.created_by.unwrap(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementMessageResponse {
            message: "Announcement created successfully".into(),
            announcement: AnnouncementResponse::from_row(announcement),
        }),
    ))
}

/// List all announcements
///
/// GET /api/announcements
pub async fn list_announcements(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = AnnouncementRepository::new(state.pool()?.clone());
    let announcements = repo.find_all().await?;

    let announcements: Vec<AnnouncementResponse> = announcements
        .into_iter()
        .map(AnnouncementResponse::from_row)
        .collect();
    Ok(Json(announcements))
}

/// The most recent announcement, or null when none exist
///
/// GET /api/announcements/latest
pub async fn latest_announcement(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = AnnouncementRepository::new(state.pool()?.clone());
    let latest = repo.latest().await?;

    Ok(Json(latest.map(AnnouncementResponse::from_row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub announcement: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: Id,
    pub announcement: String,
    pub created_by: String,
    pub created_at: String,
}

impl AnnouncementResponse {
    pub fn from_row(row: AnnouncementRow) -> Self {
        Self {
            id: row.id,
            announcement: row.announcement,
            created_by: row.created_by,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnnouncementMessageResponse {
    pub message: String,
    pub announcement: AnnouncementResponse,
}
