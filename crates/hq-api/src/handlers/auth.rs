//! Sign-in and session-check handlers.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use hq_db::UserRepository;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

/// Sign a user in with email and password
///
/// POST /api/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(dto): Json<SigninRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.email) && present(&dto.password)) {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let repo = UserRepository::new(state.pool()?.clone());
    let user = repo
        .find_by_email(dto.email.as_deref().unwrap())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let valid = hq_auth::verify_password(dto.password.as_deref().unwrap(), &user.password_hash)
        .map_err(|e| {
            warn!(email = %user.email, error = %e, "Stored password hash unusable");
            ApiError::internal("Server error")
        })?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    Ok(Json(SigninResponse {
        name: user.name,
        email: user.email,
        branch: user.branch,
        role: user.role,
        zone: user.zone,
        registered_modules: user.registered_modules,
    }))
}

/// Check that a presented session token is still valid
///
/// GET /api/auth/check-session
pub async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start_matches("Bearer ").to_string())
        .ok_or_else(|| ApiError::unauthorized("No token provided."))?;

    state
        .tokens
        .verify_token(&token)
        .map_err(|_| ApiError::unauthorized("Failed to authenticate token."))?;

    Ok(Json(Message::new("Session active")))
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub name: String,
    pub email: String,
    pub branch: String,
    pub role: String,
    pub zone: String,
    pub registered_modules: Vec<String>,
}
