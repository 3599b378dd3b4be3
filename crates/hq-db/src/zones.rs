//! Zone directory repository.
//!
//! Each zone carries the flat list of branch names that belong to it.
//! Branch edits are read-modify-write against that list.

use hq_core::types::Id;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::repository::{RepositoryError, RepositoryResult};

/// Zone database entity
#[derive(Debug, Clone, FromRow)]
pub struct ZoneRow {
    pub id: i64,
    pub zone_name: String,
    pub branches: Vec<String>,
}

impl ZoneRow {
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}

/// Default zone/branch directory, installed on first start
pub const DEFAULT_ZONES: &[(&str, &[&str])] = &[
    (
        "Zone A",
        &["Headquarters", "I-8", "F-7/1", "F-7/2", "G-9"],
    ),
    (
        "Zone B",
        &["F-10", "F-11", "E-11", "Wah Cantt", "G-13", "Golra"],
    ),
    (
        "Zone C",
        &["Saddar", "Commercial 1 & 2", "Old Workshop", "Support Center"],
    ),
    (
        "Zone D",
        &["Ghauri Town", "Tramri", "PWD", "Scheme 3"],
    ),
    (
        "Zone E",
        &["Adyala", "Kalma", "Bahria", "Zaraj GT Road", "Giga", "Warehouse Humak"],
    ),
    ("Zone F", &["Peshawar", "Mardan"]),
];

const ZONE_COLUMNS: &str = "id, zone_name, branches";

/// Zone repository implementation
pub struct ZoneRepository {
    pool: PgPool,
}

impl ZoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<ZoneRow>> {
        let rows = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones ORDER BY zone_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_name(&self, zone_name: &str) -> RepositoryResult<Option<ZoneRow>> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE zone_name = $1"
        ))
        .bind(zone_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ZoneRow>> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM zones")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Append a branch to a zone, addressed by zone name
    pub async fn add_branch(&self, zone_name: &str, branch: &str) -> RepositoryResult<ZoneRow> {
        let mut zone = self
            .find_by_name(zone_name)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Zone {} not found", zone_name)))?;

        zone.branches.push(branch.to_string());
        self.save_branches(zone.id, &zone.branches).await?;

        Ok(zone)
    }

    /// Rename a branch within a zone; passing no new name removes it.
    pub async fn edit_branch(
        &self,
        zone_id: Id,
        old_branch: &str,
        new_branch: Option<&str>,
    ) -> RepositoryResult<ZoneRow> {
        let mut zone = self
            .find_by_id(zone_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Zone {} not found", zone_id)))?;

        let index = zone
            .branches
            .iter()
            .position(|b| b == old_branch)
            .ok_or_else(|| RepositoryError::NotFound(format!("Branch {} not found", old_branch)))?;

        match new_branch {
            Some(name) if !name.is_empty() => zone.branches[index] = name.to_string(),
            _ => {
                zone.branches.remove(index);
            }
        }

        self.save_branches(zone.id, &zone.branches).await?;

        Ok(zone)
    }

    /// Remove a branch from a zone
    pub async fn delete_branch(&self, zone_id: Id, branch: &str) -> RepositoryResult<ZoneRow> {
        let mut zone = self
            .find_by_id(zone_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Zone {} not found", zone_id)))?;

        let index = zone
            .branches
            .iter()
            .position(|b| b == branch)
            .ok_or_else(|| RepositoryError::NotFound(format!("Branch {} not found", branch)))?;

        zone.branches.remove(index);
        self.save_branches(zone.id, &zone.branches).await?;

        Ok(zone)
    }

    /// Install the default directory if the table is empty
    pub async fn seed_defaults(&self) -> RepositoryResult<()> {
        if self.count().await? > 0 {
            return Ok(());
        }

        for (zone_name, branches) in DEFAULT_ZONES {
            let branches: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
            sqlx::query("INSERT INTO zones (zone_name, branches) VALUES ($1, $2)")
                .bind(zone_name)
                .bind(&branches)
                .execute(&self.pool)
                .await?;
        }

        info!("Default zones and branches installed");
        Ok(())
    }

    async fn save_branches(&self, zone_id: Id, branches: &[String]) -> RepositoryResult<()> {
        sqlx::query("UPDATE zones SET branches = $2 WHERE id = $1")
            .bind(zone_id)
            .bind(branches)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zones_cover_the_directory() {
        assert_eq!(DEFAULT_ZONES.len(), 6);
        for (zone_name, branches) in DEFAULT_ZONES {
            assert!(zone_name.starts_with("Zone "));
            assert!(!branches.is_empty());
        }
    }

    #[test]
    fn test_has_branch() {
        let zone = ZoneRow {
            id: 1,
            zone_name: "Zone A".into(),
            branches: vec!["Headquarters".into(), "I-8".into()],
        };

        assert!(zone.has_branch("I-8"));
        assert!(!zone.has_branch("F-10"));
    }
}
