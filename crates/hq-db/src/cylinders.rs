//! Cylinder-expiry repository.
//!
//! A record tracks the expiry dates of the gas cylinders kept at one
//! location of a branch; the per-cylinder entries are stored as a JSONB
//! array on the record.

use chrono::{DateTime, Utc};
use hq_core::types::Id;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// One cylinder entry within an expiry record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CylinderEntry {
    pub category: String,
    pub weight: String,
    pub date: DateTime<Utc>,
}

impl CylinderEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

/// Cylinder-expiry database entity
#[derive(Debug, Clone, FromRow)]
pub struct CylinderRow {
    pub id: i64,
    pub location: String,
    pub entries: Json<Vec<CylinderEntry>>,
    pub zone: String,
    pub branch: String,
}

/// DTO for creating a cylinder-expiry record
#[derive(Debug, Clone)]
pub struct CreateCylinderExpiryDto {
    pub location: String,
    pub entries: Vec<CylinderEntry>,
    pub zone: String,
    pub branch: String,
}

const CYLINDER_COLUMNS: &str = "id, location, entries, zone, branch";

/// Cylinder-expiry repository implementation
pub struct CylinderRepository {
    pool: PgPool,
}

impl CylinderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateCylinderExpiryDto) -> RepositoryResult<CylinderRow> {
        let row = sqlx::query_as::<_, CylinderRow>(&format!(
            r#"
            INSERT INTO cylinder_expiry (location, entries, zone, branch)
            VALUES ($1, $2, $3, $4)
            RETURNING {CYLINDER_COLUMNS}
            "#
        ))
        .bind(&dto.location)
        .bind(Json(&dto.entries))
        .bind(&dto.zone)
        .bind(&dto.branch)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Expiry records for one zone/branch
    pub async fn find_by_zone_branch(
        &self,
        zone: &str,
        branch: &str,
    ) -> RepositoryResult<Vec<CylinderRow>> {
        let rows = sqlx::query_as::<_, CylinderRow>(&format!(
            "SELECT {CYLINDER_COLUMNS} FROM cylinder_expiry \
             WHERE zone = $1 AND branch = $2 ORDER BY id"
        ))
        .bind(zone)
        .bind(branch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM cylinder_expiry WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Cylinder record {} not found",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entry_expiry() {
        let now = Utc::now();
        let entry = CylinderEntry {
            category: "CO2".into(),
            weight: "6 kg".into(),
            date: now - Duration::days(1),
        };

        assert!(entry.is_expired(now));
        assert!(!entry.is_expired(now - Duration::days(2)));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = CylinderEntry {
            category: "LPG".into(),
            weight: "5-10 Litre".into(),
            date: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["category"], "LPG");
        assert_eq!(json["weight"], "5-10 Litre");
        assert!(json.get("date").is_some());
    }
}
