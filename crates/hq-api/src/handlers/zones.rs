//! Zone directory handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use hq_core::types::Id;
use hq_db::{ZoneRepository, ZoneRow};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::present;

/// List all zones with their branches
///
/// GET /api/zones
pub async fn list_zones(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = ZoneRepository::new(state.pool()?.clone());
    let zones = repo.find_all().await?;

    let zones: Vec<ZoneResponse> = zones.into_iter().map(ZoneResponse::from_row).collect();
    Ok(Json(zones))
}

/// Branches of one zone
///
/// GET /api/zones/:zone_name/branches
pub async fn list_zone_branches(
    State(state): State<AppState>,
    Path(zone_name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = ZoneRepository::new(state.pool()?.clone());
    let zone = repo
        .find_by_name(&zone_name)
        .await?
        .ok_or_else(|| ApiError::not_found("Zone not found"))?;

    Ok(Json(zone.branches))
}

/// Add a branch to a zone
///
/// POST /api/zones/:zone_name/addBranch
pub async fn add_branch(
    State(state): State<AppState>,
    Path(zone_name): Path<String>,
    Json(dto): Json<AddBranchRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.branch_name) {
        return Err(ApiError::bad_request("Branch name is required"));
    }
    let branch_name = dto.branch_name.unwrap();

    let repo = ZoneRepository::new(state.pool()?.clone());
    let zone = repo
        .add_branch(&zone_name, &branch_name)
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Zone not found"),
            other => other.into(),
        })?;

    Ok(Json(ZoneMessageResponse {
        message: format!("Branch {} added to zone {}", branch_name, zone_name),
        zone: ZoneResponse::from_row(zone),
    }))
}

/// Rename a branch within a zone; omitting the new name removes it
///
/// PUT /api/zones/:zone_id/editBranch
pub async fn edit_branch(
    State(state): State<AppState>,
    Path(zone_id): Path<Id>,
    Json(dto): Json<EditBranchRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.old_branch_name) {
        return Err(ApiError::bad_request("Old branch name is required"));
    }
    let old_branch_name = dto.old_branch_name.unwrap();

    let repo = ZoneRepository::new(state.pool()?.clone());
    let zone = repo
        .edit_branch(zone_id, &old_branch_name, dto.new_branch_name.as_deref())
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(msg) if msg.starts_with("Branch") => {
                ApiError::not_found("Branch not found")
            }
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Zone not found"),
            other => other.into(),
        })?;

    Ok(Json(ZoneMessageResponse {
        message: format!("Branch {} updated successfully", old_branch_name),
        zone: ZoneResponse::from_row(zone),
    }))
}

/// Remove a branch from a zone
///
/// DELETE /api/zones/:zone_id/deleteBranch
pub async fn delete_branch(
    State(state): State<AppState>,
    Path(zone_id): Path<Id>,
    Json(dto): Json<DeleteBranchRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.branch_name) {
        return Err(ApiError::bad_request("Branch name is required"));
    }
    let branch_name = dto.branch_name.unwrap();

    let repo = ZoneRepository::new(state.pool()?.clone());
    let zone = repo
        .delete_branch(zone_id, &branch_name)
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(msg) if msg.starts_with("Branch") => {
                ApiError::not_found("Branch not found")
            }
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Zone not found"),
            other => other.into(),
        })?;

    Ok(Json(ZoneMessageResponse {
        message: format!("Branch {} removed successfully", branch_name),
        zone: ZoneResponse::from_row(zone),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBranchRequest {
    pub branch_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBranchRequest {
    pub old_branch_name: Option<String>,
    pub new_branch_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBranchRequest {
    pub branch_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResponse {
    pub id: Id,
    pub zone_name: String,
    pub branches: Vec<String>,
}

impl ZoneResponse {
    pub fn from_row(row: ZoneRow) -> Self {
        Self {
            id: row.id,
            zone_name: row.zone_name,
            branches: row.branches,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZoneMessageResponse {
    pub message: String,
    pub zone: ZoneResponse,
}
