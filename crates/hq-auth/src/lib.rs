//! # hq-auth
//!
//! Credential handling for BranchHQ: argon2 password hashing for stored
//! accounts and JWT verification for the session-check route. Token
//! issuance lives with the identity provider, not here; this crate only
//! needs to verify what clients present.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, SessionTokens};
pub use password::{hash_password, verify_password, PasswordError};
