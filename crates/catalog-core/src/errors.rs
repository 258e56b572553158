//! Error types for the catalog core library.

use rusqlite::ErrorCode;

/// Coarse failure classes surfaced to callers that need to tell an empty
/// result apart from a failed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    ConstraintViolation,
    MalformedInput,
    Storage,
    Io,
    Config,
}

/// Top-level error enum for the catalog core library.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Store unreachable, busy past the timeout, or not a database at all.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Duplicate primary key, NOT NULL violation, or enforced foreign key.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("SQLite error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Connectivity(_) => ErrorKind::Connectivity,
            CatalogError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            CatalogError::MalformedInput(_) => ErrorKind::MalformedInput,
            CatalogError::Storage(_) => ErrorKind::Storage,
            CatalogError::Io(_) => ErrorKind::Io,
            CatalogError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        CatalogError::MalformedInput(message.into())
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => {
                CatalogError::ConstraintViolation(err.to_string())
            }
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::SystemIoFailure,
            ) => CatalogError::Connectivity(err.to_string()),
            _ => CatalogError::Storage(err),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn duplicate_key_maps_to_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
            .unwrap();
        conn.execute("INSERT INTO t(id) VALUES (1);", []).unwrap();
        let err = conn.execute("INSERT INTO t(id) VALUES (1);", []).unwrap_err();
        assert_eq!(CatalogError::from(err).kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn unknown_table_maps_to_storage() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("DELETE FROM missing;", []).unwrap_err();
        let err = CatalogError::from(err);
        assert_eq!(err.kind(), ErrorKind::Storage);
        let source = std::error::Error::source(&err).expect("rusqlite error kept as source");
        assert!(source.to_string().contains("missing"));
    }
}
