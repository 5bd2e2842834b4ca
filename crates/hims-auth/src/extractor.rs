//! Bearer token authentication extractor.
//!
//! ```ignore
//! async fn me(BearerAuth(staff): BearerAuth) -> String {
//!     format!("Hello, {}!", staff.display_name)
//! }
//! ```

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use hims_core::Staff;

use crate::error::AuthError;
use crate::service::AuthService;

/// State required by [`BearerAuth`], exposed from the application state
/// through `FromRef`.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

/// The active staff member behind the request's `Authorization: Bearer` token.
///
/// Rejects with `401` when the header is missing, the token does not
/// validate, or the account no longer exists or is inactive.
#[derive(Debug, Clone)]
pub struct BearerAuth(pub Staff);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let staff = auth_state.service.authenticate(token).await?;
        tracing::debug!(staff_id = %staff.id, role = %staff.role, "Token validated");
        Ok(BearerAuth(staff))
    }
}
