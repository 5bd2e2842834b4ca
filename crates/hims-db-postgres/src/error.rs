//! Error types for the PostgreSQL storage backend.

use hims_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for check violation (23514).
pub const PG_CHECK_VIOLATION: &str = "23514";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Name of the constraint a database error was raised for, if any.
pub fn violated_constraint(err: &SqlxError) -> Option<&str> {
    match err {
        SqlxError::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Maps a query error to a storage error.
///
/// Unique violations become `Conflict` using `conflict_message` for the
/// constraint that fired; check violations become `InvalidRecord`.
pub(crate) fn map_query_error(
    err: SqlxError,
    conflict_message: impl FnOnce(Option<&str>) -> String,
) -> StorageError {
    if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
        return StorageError::conflict(conflict_message(violated_constraint(&err)));
    }
    if has_pg_error_code(&err, PG_CHECK_VIOLATION) {
        return StorageError::invalid_record(err.to_string());
    }
    query_error(err)
}

/// Maps a query error with no expected constraint violations.
pub(crate) fn query_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
            StorageError::connection_error(err.to_string())
        }
        SqlxError::ColumnDecode { .. } | SqlxError::Decode(_) => {
            StorageError::invalid_record(err.to_string())
        }
        _ => StorageError::internal(err.to_string()),
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_errors() {
        let err = query_error(SqlxError::PoolTimedOut);
        assert!(matches!(err, StorageError::ConnectionError { .. }));
    }

    #[test]
    fn test_non_database_error_has_no_constraint() {
        assert!(violated_constraint(&SqlxError::RowNotFound).is_none());
        assert!(!has_pg_error_code(&SqlxError::RowNotFound, PG_UNIQUE_VIOLATION));
    }

    #[test]
    fn test_postgres_error_into_storage_error() {
        let err: StorageError = PostgresError::config("missing url").into();
        assert!(matches!(err, StorageError::Internal { .. }));
    }
}
