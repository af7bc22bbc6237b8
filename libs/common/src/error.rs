//! Infrastructure error types and helpers for classifying driver errors

use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Embedded migrations could not be applied
    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        DatabaseError::Query(err)
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// A write collided with a UNIQUE constraint
pub fn is_unique_violation(err: &SqlxError) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// A write referenced a row that does not exist
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        let err = SqlxError::RowNotFound;
        assert!(!is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert!(matches!(DatabaseError::from(err), DatabaseError::Query(_)));
    }
}
