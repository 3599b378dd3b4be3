//! Session token verification.
//!
//! Clients present a JWT in the `Authorization` header; the session-check
//! route accepts it if the signature is valid and the token is not expired.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// User email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// Keys for encoding and decoding session tokens
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionTokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token. Used by tests and tooling; production tokens come
    /// from the identity provider sharing the same secret.
    pub fn create_token(
        &self,
        user_id: i64,
        email: Option<String>,
        expires_in_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now as i64 + expires_in_seconds) as usize,
            iat: now,
            email,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate a presented token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let tokens = SessionTokens::new(b"test-secret");
        let token = tokens
            .create_token(42, Some("user@example.com".into()), 3600)
            .unwrap();

        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_expired_token() {
        let tokens = SessionTokens::new(b"test-secret");
        let token = tokens.create_token(1, None, -120).unwrap();

        assert!(matches!(tokens.verify_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = SessionTokens::new(b"secret-a");
        let verifier = SessionTokens::new(b"secret-b");
        let token = issuer.create_token(1, None, 3600).unwrap();

        assert!(matches!(
            verifier.verify_token(&token),
            Err(JwtError::Invalid(_))
        ));
    }
}
