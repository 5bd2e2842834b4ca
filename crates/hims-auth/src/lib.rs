//! Staff authentication for the HIMS server.
//!
//! - [`password`]: Argon2id hashing of staff passwords.
//! - [`jwt`]: HS256 access tokens.
//! - [`AuthService`]: login, token authentication and account creation.
//! - [`BearerAuth`]: axum extractor resolving the calling staff member.

pub mod error;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod service;

pub use error::AuthError;
pub use extractor::{AuthState, BearerAuth};
pub use jwt::{Claims, IssuedToken, JwtService, MAX_TOKEN_TTL_SECS, MIN_SECRET_LEN};
pub use service::{AuthService, Session, StaffRegistration, require_role};
