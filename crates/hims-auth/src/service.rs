//! Staff login, token authentication and account creation.

use std::sync::Arc;

use hims_core::{NewStaff, Staff, StaffRole};
use hims_storage::DynStorage;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AuthError;
use crate::jwt::{IssuedToken, JwtService};
use crate::password::{hash_password, validate_password, verify_password};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub staff: Staff,
    pub token: IssuedToken,
}

/// Request to create a staff account with a plaintext password.
#[derive(Debug, Clone)]
pub struct StaffRegistration {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub password: String,
}

#[derive(Clone)]
pub struct AuthService {
    storage: DynStorage,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(storage: DynStorage, jwt: Arc<JwtService>) -> Self {
        Self { storage, jwt }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Verifies a username/password pair and issues a token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller. Inactive accounts are refused after the password check.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(credentials) = self.storage.staff().find_credentials(username.trim()).await?
        else {
            debug!("Unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let candidate = password.to_owned();
        let hash = credentials.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| AuthError::hashing(format!("verification task failed: {e}")))??;
        if !matches {
            debug!("Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let staff = credentials.staff;
        if !staff.active {
            debug!(staff_id = %staff.id, "Inactive account refused");
            return Err(AuthError::Inactive {
                username: staff.username,
            });
        }

        let token = self.jwt.issue(&staff, OffsetDateTime::now_utc())?;
        info!(staff_id = %staff.id, role = %staff.role, "Staff logged in");
        Ok(Session { staff, token })
    }

    /// Resolves a bearer token to the current staff record.
    ///
    /// The record is reloaded on every call so deactivation and role
    /// changes take effect before the token expires.
    pub async fn authenticate(&self, token: &str) -> Result<Staff, AuthError> {
        let claims = self.jwt.decode(token)?;
        let staff = self
            .storage
            .staff()
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::invalid_token("unknown subject"))?;
        if !staff.active {
            debug!(staff_id = %staff.id, "Token of inactive account");
            return Err(AuthError::Inactive {
                username: staff.username,
            });
        }
        Ok(staff)
    }

    /// Creates an account, hashing the password with Argon2id.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a short password or invalid fields, `Storage`
    /// (conflict) for a taken username.
    #[instrument(skip(self, registration), fields(username = %registration.username, role = %registration.role))]
    pub async fn register_staff(&self, registration: StaffRegistration) -> Result<Staff, AuthError> {
        validate_password(&registration.password)?;

        let mut new = NewStaff {
            username: registration.username,
            display_name: registration.display_name,
            email: registration.email,
            role: registration.role,
            password_hash: String::new(),
        };
        new.validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        let password = registration.password;
        new.password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::hashing(format!("hashing task failed: {e}")))??;

        let staff = self
            .storage
            .staff()
            .create(&new.into_credentials(Uuid::new_v4(), OffsetDateTime::now_utc()))
            .await?;
        info!(staff_id = %staff.id, "Staff account created");
        Ok(staff)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}

/// Fails with `Forbidden` unless `staff` holds one of `roles`.
pub fn require_role(staff: &Staff, roles: &[StaffRole]) -> Result<(), AuthError> {
    if roles.contains(&staff.role) {
        return Ok(());
    }
    let allowed: Vec<&str> = roles.iter().map(StaffRole::as_str).collect();
    Err(AuthError::forbidden(format!(
        "role {} may not perform this action (requires {})",
        staff.role,
        allowed.join(" or ")
    )))
}
