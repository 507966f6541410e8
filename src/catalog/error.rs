use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid catalog request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    /// Failures the caller may retry by re-triggering the same action.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Database(_) | CatalogError::Unavailable(_))
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CatalogError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CatalogError::Unavailable(err.to_string())
    }
}
