//! Admission workflow error types.

use std::fmt;

use hims_core::CoreError;
use hims_storage::StorageError;

/// Errors returned by the admission workflow.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// A referenced patient, staff member, bed or admission does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A precondition on roles, field values or lifecycle state failed.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// A precondition of conflict shape failed: the bed is taken or the
    /// patient is already admitted.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The underlying store failed.
    #[error(transparent)]
    Storage(StorageError),
}

impl AdmissionError {
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// `true` for every rule violation, including conflicts.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Conflict { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Storage(_) => ErrorCategory::Infrastructure,
        }
    }
}

impl From<StorageError> for AdmissionError {
    /// Constraint violations reported by the store are rule violations of
    /// the workflow; everything else is infrastructure.
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Conflict { message } => Self::Conflict { message },
            other => Self::Storage(other),
        }
    }
}

impl From<CoreError> for AdmissionError {
    fn from(err: CoreError) -> Self {
        if err.is_client_error() {
            Self::validation(err.to_string())
        } else {
            Self::Storage(StorageError::internal(err.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Conflict,
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}
