//! Support-ticket handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hq_db::{generate_ticket_number, CreateTicketDto, TicketRepository, TicketRow};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::{present, Message};

/// Open a new ticket
///
/// POST /api/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(dto): Json<CreateTicketRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(present(&dto.subject) && present(&dto.description) && present(&dto.created_by)) {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let repo = TicketRepository::new(state.pool()?.clone());
    let ticket = repo
        .create(CreateTicketDto {
            ticket_number: generate_ticket_number(),
            subject: dto.subject.unwrap(),
            description: dto.description.unwrap(),
            created_by: dto.created_by.unwrap(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketMessageResponse {
            message: "Ticket created successfully".into(),
            ticket: TicketResponse::from_row(ticket),
        }),
    ))
}

/// List all tickets
///
/// GET /api/tickets
pub async fn list_tickets(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = TicketRepository::new(state.pool()?.clone());
    let tickets = repo.find_all().await?;

    let tickets: Vec<TicketResponse> = tickets.into_iter().map(TicketResponse::from_row).collect();
    Ok(Json(tickets))
}

/// Get a ticket by its ticket number
///
/// GET /api/tickets/:ticket_number
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = TicketRepository::new(state.pool()?.clone());
    let ticket = repo
        .find_by_number(&ticket_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    Ok(Json(TicketResponse::from_row(ticket)))
}

/// Update a ticket's status
///
/// PUT /api/tickets/:ticket_number/status
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
    Json(dto): Json<UpdateTicketStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    if !present(&dto.status) {
        return Err(ApiError::bad_request("Status is required"));
    }

    let repo = TicketRepository::new(state.pool()?.clone());
    let ticket = repo
        .update_status(&ticket_number, dto.status.as_deref().unwrap())
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Ticket not found"),
            other => other.into(),
        })?;

    Ok(Json(TicketMessageResponse {
        message: "Ticket status updated".into(),
        ticket: TicketResponse::from_row(ticket),
    }))
}

/// Delete a ticket
///
/// DELETE /api/tickets/:ticket_number
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = TicketRepository::new(state.pool()?.clone());
    repo.delete_by_number(&ticket_number)
        .await
        .map_err(|e| match e {
            hq_db::RepositoryError::NotFound(_) => ApiError::not_found("Ticket not found"),
            other => other.into(),
        })?;

    Ok(Json(Message::new("Ticket deleted successfully")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub ticket_id: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TicketResponse {
    pub fn from_row(row: TicketRow) -> Self {
        Self {
            ticket_id: row.ticket_number,
            subject: row.subject,
            description: row.description,
            status: row.status,
            created_by: row.created_by,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketMessageResponse {
    pub message: String,
    pub ticket: TicketResponse,
}
