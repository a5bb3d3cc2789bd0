// Errors raised while reading or writing the record store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to open record store at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("failed to {action}: {source}")]
    Query {
        action: &'static str,
        source: rusqlite::Error,
    },

    #[error("invalid value in {table}.{column}: {message}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        message: String,
    },
}

/// Attach a description of the failed action to a rusqlite result.
pub(crate) trait QueryContext<T> {
    fn context(self, action: &'static str) -> Result<T, DataSourceError>;
}

impl<T> QueryContext<T> for Result<T, rusqlite::Error> {
    fn context(self, action: &'static str) -> Result<T, DataSourceError> {
        self.map_err(|source| DataSourceError::Query { action, source })
    }
}
