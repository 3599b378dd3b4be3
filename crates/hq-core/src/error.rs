//! Core error types for BranchHQ.
//!
//! Every layer maps its failures into this taxonomy; the API layer turns it
//! into an HTTP status plus a JSON `{"message"}` body.

use thiserror::Error;

/// Core error type for all BranchHQ operations
#[derive(Error, Debug)]
pub enum HqError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HqError {
    pub fn not_found(entity: &'static str) -> Self {
        HqError::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HqError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HqError::Conflict {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HqError::Unauthorized {
            message: message.into(),
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            HqError::NotFound { .. } => 404,
            HqError::Validation { .. } => 400,
            HqError::Unauthorized { .. } => 401,
            HqError::Conflict { .. } => 409,
            HqError::Database(_)
            | HqError::Storage(_)
            | HqError::Internal(_)
            | HqError::Config(_) => 500,
        }
    }
}

/// Standard Result type for BranchHQ operations
pub type HqResult<T> = Result<T, HqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(HqError::not_found("User").status_code(), 404);
        assert_eq!(HqError::validation("missing field").status_code(), 400);
        assert_eq!(HqError::conflict("email exists").status_code(), 409);
        assert_eq!(HqError::unauthorized("bad token").status_code(), 401);
        assert_eq!(HqError::Storage("blob write".into()).status_code(), 500);
    }
}
