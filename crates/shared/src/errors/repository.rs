use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[source] SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Timed out waiting for row lock")]
    LockTimeout,

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.into_owned()));

        match code.as_deref() {
            Some("23503") => RepositoryError::ForeignKey(err.to_string()),
            Some("23514") => RepositoryError::CheckViolation(err.to_string()),
            Some("55P03") => RepositoryError::LockTimeout,
            _ => match err {
                SqlxError::RowNotFound => RepositoryError::NotFound,
                other => RepositoryError::Sqlx(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = RepositoryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn pool_timeout_stays_a_database_error() {
        let err = RepositoryError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Sqlx(_)));
    }
}
