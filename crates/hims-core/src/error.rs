use thiserror::Error;

/// Core error types for HIMS domain values
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("Unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid admission number: {0}")]
    InvalidAdmissionNumber(String),

    #[error("Admission number sequence exhausted for year {year}")]
    SequenceExhausted { year: i32 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),
}

impl CoreError {
    /// Create a new InvalidField error
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Create a new UnknownVariant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Create a new InvalidAdmissionNumber error
    pub fn invalid_admission_number(value: impl Into<String>) -> Self {
        Self::InvalidAdmissionNumber(value.into())
    }

    /// Create a new InvalidDate error
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidField { .. }
                | Self::UnknownVariant { .. }
                | Self::InvalidAdmissionNumber(_)
                | Self::InvalidDate(_)
                | Self::SequenceExhausted { .. }
                | Self::JsonError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidField { .. }
            | Self::UnknownVariant { .. }
            | Self::InvalidAdmissionNumber(_)
            | Self::InvalidDate(_) => ErrorCategory::Validation,
            Self::SequenceExhausted { .. } => ErrorCategory::Exhausted,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::UuidError(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Exhausted,
    Serialization,
    System,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
