//! User repository.

use async_trait::async_trait;
use hq_core::types::Id;
use sqlx::{FromRow, PgPool};

use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub zone: String,
    pub branch: String,
    pub registered_modules: Vec<String>,
}

impl UserRow {
    pub fn has_module(&self, module: &str) -> bool {
        self.registered_modules.iter().any(|m| m == module)
    }
}

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub zone: String,
    pub branch: String,
    pub registered_modules: Vec<String>,
}

/// DTO for updating a user's details
#[derive(Debug, Clone)]
pub struct UpdateUserDto {
    pub name: String,
    pub display_name: String,
    pub role: String,
    pub zone: String,
    pub branch: String,
}

const USER_COLUMNS: &str = "id, name, display_name, username, email, password_hash, \
                            role, zone, branch, registered_modules";

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Which of the given emails already belong to accounts
    pub async fn existing_emails(&self, emails: &[String]) -> RepositoryResult<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE email = ANY($1)",
        )
        .bind(emails)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Replace a user's registered modules
    pub async fn update_modules(
        &self,
        id: Id,
        modules: &[String],
    ) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET registered_modules = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(modules)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", id)))?;

        Ok(row)
    }

    /// Replace a user's stored password hash
    pub async fn reset_password(&self, id: Id, password_hash: &str) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET password_hash = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", id)))?;

        Ok(row)
    }

    /// Insert a batch of users in one transaction; all or nothing.
    pub async fn create_many(&self, dtos: Vec<CreateUserDto>) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        for dto in &dtos {
            sqlx::query(
                r#"
                INSERT INTO users (name, display_name, username, email, password_hash,
                                   role, zone, branch, registered_modules)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&dto.name)
            .bind(&dto.display_name)
            .bind(&dto.username)
            .bind(&dto.email)
            .bind(&dto.password_hash)
            .bind(&dto.role)
            .bind(&dto.zone)
            .bind(&dto.branch)
            .bind(&dto.registered_modules)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<UserRow, CreateUserDto, UpdateUserDto> for UserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, display_name, username, email, password_hash,
                               role, zone, branch, registered_modules)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.display_name)
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.password_hash)
        .bind(&dto.role)
        .bind(&dto.zone)
        .bind(&dto.branch)
        .bind(&dto.registered_modules)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateUserDto) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $2, display_name = $3, role = $4, zone = $5, branch = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.display_name)
        .bind(&dto.role)
        .bind(&dto.zone)
        .bind(&dto.branch)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", id)))?;

        Ok(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_module() {
        let user = UserRow {
            id: 1,
            name: "Test User".into(),
            display_name: "Test".into(),
            username: "test".into(),
            email: "test@example.com".into(),
            password_hash: "hash".into(),
            role: "manager".into(),
            zone: "Zone A".into(),
            branch: "Headquarters".into(),
            registered_modules: vec!["tasks".into(), "files".into()],
        };

        assert!(user.has_module("tasks"));
        assert!(!user.has_module("tickets"));
    }
}
