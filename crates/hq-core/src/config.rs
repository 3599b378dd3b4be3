//! Configuration types and loading.
//!
//! Settings come from the environment (a `.env` file is loaded by the server
//! binary before this runs); every field has a usable default so the server
//! can start in a development environment with nothing set.

use serde::{Deserialize, Serialize};

use crate::error::{HqError, HqResult};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to verify session tokens
    pub jwt_secret: String,
    /// Session token lifetime in minutes
    pub session_timeout_minutes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Domain appended to usernames when deriving account emails
    pub domain: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Maximum accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/branchhq".into(),
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            auth: AuthConfig {
                jwt_secret: "development-secret".into(),
                session_timeout_minutes: 60,
            },
            mail: MailConfig {
                domain: "example.com".into(),
            },
            files: FilesConfig {
                max_upload_bytes: 25 * 1024 * 1024,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> HqResult<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| HqError::Config(format!("invalid PORT: {port}")))?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(max) = std::env::var("DB_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .map_err(|_| HqError::Config(format!("invalid DB_MAX_CONNECTIONS: {max}")))?;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Ok(minutes) = std::env::var("SESSION_TIMEOUT_MINUTES") {
            config.auth.session_timeout_minutes = minutes.parse().map_err(|_| {
                HqError::Config(format!("invalid SESSION_TIMEOUT_MINUTES: {minutes}"))
            })?;
        }
        if let Ok(domain) = std::env::var("MAIL_DOMAIN") {
            config.mail.domain = domain;
        }
        if let Ok(bytes) = std::env::var("MAX_UPLOAD_BYTES") {
            config.files.max_upload_bytes = bytes
                .parse()
                .map_err(|_| HqError::Config(format!("invalid MAX_UPLOAD_BYTES: {bytes}")))?;
        }

        Ok(config)
    }

    /// Socket address string for the HTTP listener
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.mail.domain, "example.com");
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:5000");
    }
}
