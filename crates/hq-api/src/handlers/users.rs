//! User account handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hq_core::types::Id;
use hq_db::{CreateUserDto, Repository, UpdateUserDto, UserRepository, UserRow};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

/// Create a new user
///
/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    if !dto.is_complete() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let email = format!("{}@{}", dto.username.as_deref().unwrap(), state.mail_domain);

    let repo = UserRepository::new(state.pool()?.clone());
    if repo.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already exists"));
    }

    let password_hash = hq_auth::hash_password(dto.password.as_deref().unwrap())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = repo
        .create(CreateUserDto {
            name: format!(
                "{} {}",
                dto.first_name.as_deref().unwrap(),
                dto.last_name.as_deref().unwrap()
            ),
            display_name: dto.display_name.unwrap(),
            username: dto.username.unwrap(),
            email,
            password_hash,
            role: dto.role.unwrap(),
            zone: dto.zone.unwrap(),
            branch: dto.branch.unwrap(),
            registered_modules: dto.modules.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            message: "User created successfully".into(),
            user: UserResponse::from_row(user),
        }),
    ))
}

/// List all users
///
/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = UserRepository::new(state.pool()?.clone());
    let users = repo.find_all().await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from_row).collect();
    Ok(Json(users))
}

/// Update a user's details
///
/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.name)
        && present(&dto.display_name)
        && present(&dto.role)
        && present(&dto.branch)
        && present(&dto.zone))
    {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let repo = UserRepository::new(state.pool()?.clone());
    let user = repo
        .update(
            id,
            UpdateUserDto {
                name: dto.name.unwrap(),
                display_name: dto.display_name.unwrap(),
                role: dto.role.unwrap(),
                zone: dto.zone.unwrap(),
                branch: dto.branch.unwrap(),
            },
        )
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("User not found"),
            other => other.into(),
        })?;

    Ok(Json(UpdatedUserResponse {
        message: "User details updated successfully".into(),
        updated_user: UserResponse::from_row(user),
    }))
}

/// Replace a user's registered modules
///
/// PUT /api/users/:id/modules
pub async fn update_user_modules(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateModulesRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = UserRepository::new(state.pool()?.clone());
    let user = repo
        .update_modules(id, &dto.modules)
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("User not found"),
            other => other.into(),
        })?;

    Ok(Json(UpdatedUserResponse {
        message: "Modules updated successfully".into(),
        updated_user: UserResponse::from_row(user),
    }))
}

/// Reset a user's password
///
/// PUT /api/users/:id/resetPassword
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(dto): Json<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.new_password) {
        return Err(ApiError::bad_request("New password is required"));
    }

    let password_hash = hq_auth::hash_password(dto.new_password.as_deref().unwrap())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let repo = UserRepository::new(state.pool()?.clone());
    let user = repo
        .reset_password(id, &password_hash)
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("User not found"),
            other => other.into(),
        })?;

    Ok(Json(CreatedUserResponse {
        message: "Password reset successfully".into(),
        user: UserResponse::from_row(user),
    }))
}

/// Delete a user
///
/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let repo = UserRepository::new(state.pool()?.clone());
    repo.delete(id).await.map_err(|e| match e {
        hq_db::RepositoryError::NotFound(_) => ApiError::not_found("User not found"),
        other => other.into(),
    })?;

    Ok(Json(Message::new("User deleted successfully")))
}

/// Create a batch of users
///
/// POST /api/users/multiple
pub async fn create_multiple_users(
    State(state): State<AppState>,
    Json(dto): Json<CreateMultipleUsersRequest>,
) -> ApiResult<impl IntoResponse> {
    let users = dto
        .users
        .ok_or_else(|| ApiError::bad_request("Invalid user data"))?;

    for user in &users {
        if !user.is_complete() {
            return Err(ApiError::bad_request(
                "Missing required fields for one or more users",
            ));
        }
    }

    let repo = UserRepository::new(state.pool()?.clone());

    let emails: Vec<String> = users.iter().map(|u| u.email.clone().unwrap()).collect();
    let existing = repo.existing_emails(&emails).await?;
    if !existing.is_empty() {
        return Ok((
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "message": "Some emails already exist",
                "existingEmails": existing,
            })),
        )
            .into_response());
    }

    let mut dtos = Vec::with_capacity(users.len());
    for user in users {
        let username = user.username.unwrap();
        let password_hash = hq_auth::hash_password(user.password.as_deref().unwrap())
            .map_err(|e| ApiError::internal(e.to_string()))?;

        dtos.push(CreateUserDto {
            name: user.name.unwrap_or_else(|| username.clone()),
            display_name: user.display_name.unwrap_or_else(|| username.clone()),
            username,
            email: user.email.unwrap(),
            password_hash,
            role: user.role.unwrap(),
            zone: user.zone.unwrap(),
            branch: user.branch.unwrap(),
            registered_modules: user.modules.unwrap_or_default(),
        });
    }

    repo.create_many(dtos).await?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new("Users added successfully")),
    )
        .into_response())
}

// Request types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub modules: Option<Vec<String>>,
}

impl CreateUserRequest {
    fn is_complete(&self) -> bool {
        present(&self.first_name)
            && present(&self.last_name)
            && present(&self.display_name)
            && present(&self.username)
            && present(&self.password)
            && present(&self.role)
            && present(&self.zone)
            && present(&self.branch)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub zone: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateModulesRequest {
    pub modules: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMultipleUsersRequest {
    pub users: Option<Vec<BulkUserRequest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUserRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub zone: Option<String>,
    pub branch: Option<String>,
    pub modules: Option<Vec<String>>,
}

impl BulkUserRequest {
    fn is_complete(&self) -> bool {
        present(&self.username)
            && present(&self.email)
            && present(&self.password)
            && present(&self.role)
            && present(&self.zone)
            && present(&self.branch)
    }
}

// Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Id,
    pub name: String,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub zone: String,
    pub branch: String,
    pub registered_modules: Vec<String>,
}

impl UserResponse {
    pub fn from_row(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            username: row.username,
            email: row.email,
            role: row.role,
            zone: row.zone,
            branch: row.branch,
            registered_modules: row.registered_modules,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUserResponse {
    pub message: String,
    pub updated_user: UserResponse,
}
