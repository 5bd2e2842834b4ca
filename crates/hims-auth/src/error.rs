//! Authentication and authorization error types.

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use hims_api::ApiError;
use hims_storage::StorageError;

/// Errors that can occur while authenticating staff or checking access.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("Missing Authorization header")]
    MissingCredentials,

    /// Username or password did not match. The message never says which.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The token is malformed, badly signed or carries unexpected claims.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The token's `exp` has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The staff account is deactivated.
    #[error("Account {username} is inactive")]
    Inactive {
        /// Username of the inactive account.
        username: String,
    },

    /// The authenticated staff member lacks the required role.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The request is malformed, such as a password below the minimum length.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// Signing key or service configuration is unusable.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Password hashing failed or a stored hash is malformed.
    #[error("Password hashing error: {message}")]
    Hashing {
        /// Description of the hashing error.
        message: String,
    },

    /// Staff lookup failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller must (re)authenticate.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::InvalidCredentials
                | Self::InvalidToken { .. }
                | Self::TokenExpired
                | Self::Inactive { .. }
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden { message } => ApiError::forbidden(message),
            AuthError::InvalidRequest { message } => ApiError::bad_request(message),
            AuthError::Storage(inner) => inner.into(),
            AuthError::Configuration { .. } | AuthError::Hashing { .. } => {
                ApiError::internal(err.to_string())
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = self.is_unauthorized();
        let mut response = ApiError::from(self).into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"hims\""),
            );
        }
        response
    }
}
