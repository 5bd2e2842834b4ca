//! HS256 access tokens for staff sessions.

use hims_core::{Staff, StaffRole};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::AuthError;

/// Minimum length of the shared signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime in seconds (30 days).
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Staff id.
    pub sub: Uuid,
    /// Role at the time the token was issued.
    pub role: StaffRole,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Signs and validates access tokens with a shared secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the secret is shorter than
    /// [`MIN_SECRET_LEN`] or the lifetime is not positive or exceeds
    /// [`MAX_TOKEN_TTL_SECS`].
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::configuration(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if !ttl.is_positive() {
            return Err(AuthError::configuration("token lifetime must be positive"));
        }
        if ttl.whole_seconds() > MAX_TOKEN_TTL_SECS as i64 {
            return Err(AuthError::configuration(format!(
                "token lifetime must not exceed {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
        })
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issues a token for `staff` valid from `now` for the configured lifetime.
    pub fn issue(&self, staff: &Staff, now: OffsetDateTime) -> Result<IssuedToken, AuthError> {
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| AuthError::configuration("token expiry is out of range"))?;
        let claims = Claims {
            sub: staff.id,
            role: staff.role,
            username: staff.username.clone(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::configuration(format!("failed to sign token: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Validates signature, issuer and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                use jsonwebtoken::errors::ErrorKind;
                match err.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::invalid_token(err.to_string()),
                }
            })
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
