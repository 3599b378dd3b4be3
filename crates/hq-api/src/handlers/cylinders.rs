//! Cylinder-expiry tracking handlers: locations, categories, and the
//! expiry records themselves.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use hq_core::types::Id;
use hq_db::{
    CategoryRepository, CategoryRow, CreateCategoryDto, CreateCylinderExpiryDto,
    CreateLocationDto, CylinderEntry, CylinderRepository, CylinderRow, LocationRepository,
    LocationRow, Repository, UpdateCategoryDto, UpdateLocationDto,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

// --- Locations ---

/// GET /api/locations
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = LocationRepository::new(state.pool()?.clone());
    let locations = repo.find_all().await?;

    let locations: Vec<LocationResponse> =
        locations.into_iter().map(LocationResponse::from_row).collect();
    Ok(Json(locations))
}

/// POST /api/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(dto): Json<LocationRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.name) {
        return Err(ApiError::bad_request("Location name is required."));
    }

    let repo = LocationRepository::new(state.pool()?.clone());
    let location = repo
        .create(CreateLocationDto {
            name: dto.name.unwrap(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LocationResponse::from_row(location))))
}

/// PUT /api/locations/:id
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<LocationRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.name) {
        return Err(ApiError::bad_request("Location name is required."));
    }

    let repo = LocationRepository::new(state.pool()?.clone());
    let location = repo
        .update(
            id,
            UpdateLocationDto {
                name: dto.name.unwrap(),
            },
        )
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Location not found."),
            other => other.into(),
        })?;

    Ok(Json(LocationResponse::from_row(location)))
}

/// DELETE /api/locations/:id
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = LocationRepository::new(state.pool()?.clone());
    repo.delete(id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Location not found."),
        other => other.into(),
    })?;

    Ok(Json(Message::new("Location deleted successfully.")))
}

// --- Categories ---

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = CategoryRepository::new(state.pool()?.clone());
    let categories = repo.find_all().await?;

    let categories: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from_row).collect();
    Ok(Json(categories))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(dto): Json<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.name) && present(&dto.weight)) {
        return Err(ApiError::bad_request("Category name and weight are required."));
    }

    let repo = CategoryRepository::new(state.pool()?.clone());
    let category = repo
        .create(CreateCategoryDto {
            name: dto.name.unwrap(),
            weight: dto.weight.unwrap(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from_row(category))))
}

/// PUT /api/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.name) && present(&dto.weight)) {
        return Err(ApiError::bad_request("Name and weight are required."));
    }

    let repo = CategoryRepository::new(state.pool()?.clone());
    let category = repo
        .update(
            id,
            UpdateCategoryDto {
                name: dto.name.unwrap(),
                weight: dto.weight.unwrap(),
            },
        )
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Category not found."),
            other => other.into(),
        })?;

    Ok(Json(CategoryResponse::from_row(category)))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = CategoryRepository::new(state.pool()?.clone());
    repo.delete(id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Category not found."),
        other => other.into(),
    })?;

    Ok(Json(Message::new("Category deleted successfully.")))
}

// --- Expiry records ---

/// Record cylinder expiry dates for a location of a branch
///
/// POST /api/cylinder-expiry
pub async fn create_cylinder_record(
    State(state): State<AppState>,
    Json(dto): Json<CreateCylinderRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.zone) && present(&dto.branch)) {
        return Err(ApiError::bad_request("Zone and branch are required fields."));
    }
    if !present(&dto.location) {
        return Err(ApiError::bad_request("Location is required."));
    }

    let entries: Vec<CylinderEntry> = dto
        .categories
        .unwrap_or_default()
        .into_iter()
        .map(|e| CylinderEntry {
            category: e.category,
            weight: e.weight,
            date: e.date,
        })
        .collect();

    let repo = CylinderRepository::new(state.pool()?.clone());
    let record = repo
        .create(CreateCylinderExpiryDto {
            location: dto.location.unwrap(),
            entries,
            zone: dto.zone.unwrap(),
            branch: dto.branch.unwrap(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CylinderResponse::from_row(record))))
}

/// Expiry records for a zone and branch; no records is a 404
///
/// GET /api/cylinder-expiry/:zone/:branch
pub async fn list_cylinder_records(
    State(state): State<AppState>,
    Path((zone, branch)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let repo = CylinderRepository::new(state.pool()?.clone());
    let records = repo.find_by_zone_branch(&zone, &branch).await?;

    if records.is_empty() {
        return Err(ApiError::not_found(
            "No cylinders found for this zone and branch.",
        ));
    }

    let records: Vec<CylinderResponse> =
        records.into_iter().map(CylinderResponse::from_row).collect();
    Ok(Json(records))
}

/// DELETE /api/cylinder-expiry/:id
pub async fn delete_cylinder_record(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = CylinderRepository::new(state.pool()?.clone());
    repo.delete(id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => {
            ApiError::not_found("No cylinder record found with that ID.")
        }
        other => other.into(),
    })?;

    Ok(Json(Message::new("Cylinder record deleted successfully.")))
}

// Request types

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub weight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCylinderRequest {
    pub location: Option<String>,
    pub categories: Option<Vec<CylinderEntryRequest>>,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CylinderEntryRequest {
    pub category: String,
    pub weight: String,
    pub date: DateTime<Utc>,
}

// Response types

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: Id,
    pub name: String,
}

impl LocationResponse {
    pub fn from_row(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Id,
    pub name: String,
    pub weight: String,
}

impl CategoryResponse {
    pub fn from_row(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            weight: row.weight,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CylinderResponse {
    pub id: Id,
    pub location: String,
    pub categories: Vec<CylinderEntry>,
    pub zone: String,
    pub branch: String,
}

impl CylinderResponse {
    pub fn from_row(row: CylinderRow) -> Self {
        Self {
            id: row.id,
            location: row.location,
            categories: row.entries.0,
            zone: row.zone,
            branch: row.branch,
        }
    }
}
