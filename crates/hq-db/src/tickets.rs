//! Support-ticket repository.
//!
//! Tickets are addressed by their 5-digit ticket number, not by row id.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Ticket database entity
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketRow {
    pub fn is_open(&self) -> bool {
        self.status == "Open"
    }
}

/// DTO for creating a ticket
#[derive(Debug, Clone)]
pub struct CreateTicketDto {
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub created_by: String,
}

/// Generate a random 5-digit ticket number
pub fn generate_ticket_number() -> String {
    rand::thread_rng().gen_range(10_000..100_000).to_string()
}

const TICKET_COLUMNS: &str =
    "id, ticket_number, subject, description, status, created_by, created_at, updated_at";

/// Ticket repository implementation
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateTicketDto) -> RepositoryResult<TicketRow> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            r#"
            INSERT INTO tickets (ticket_number, subject, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(&dto.ticket_number)
        .bind(&dto.subject)
        .bind(&dto.description)
        .bind(&dto.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!(
                    "Ticket number {} already exists",
                    dto.ticket_number
                ))
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(row)
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<TicketRow>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_number(&self, ticket_number: &str) -> RepositoryResult<Option<TicketRow>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_number = $1"
        ))
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Update a ticket's status, bumping its updated time
    pub async fn update_status(
        &self,
        ticket_number: &str,
        status: &str,
    ) -> RepositoryResult<TicketRow> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            r#"
            UPDATE tickets SET status = $2, updated_at = NOW()
            WHERE ticket_number = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_number)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Ticket {} not found", ticket_number)))?;

        Ok(row)
    }

    pub async fn delete_by_number(&self, ticket_number: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE ticket_number = $1")
            .bind(ticket_number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Ticket {} not found",
                ticket_number
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ticket_number_is_five_digits() {
        for _ in 0..100 {
            let number = generate_ticket_number();
            assert_eq!(number.len(), 5);
            let value: u32 = number.parse().unwrap();
            assert!((10_000..100_000).contains(&value));
        }
    }

    #[test]
    fn test_is_open() {
        let mut ticket = TicketRow {
            id: 1,
            ticket_number: "12345".into(),
            subject: "Oven broken".into(),
            description: "Deck oven will not heat".into(),
            status: "Open".into(),
            created_by: "branch-manager".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(ticket.is_open());
        ticket.status = "Closed".into();
        assert!(!ticket.is_open());
    }
}
