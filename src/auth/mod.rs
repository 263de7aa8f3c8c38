//! Bearer-token authentication
//!
//! Token issuance and verification, the request gate for protected routes,
//! and password hashing.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::require_auth;
pub use password::PasswordHasher;
pub use token::{bearer_token, AuthError, Claims, IssuedToken, TokenIssuer, TokenVerifier};
