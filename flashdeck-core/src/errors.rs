use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("storage error: {0}")]
    Storage(&'static str),
    #[error("blob error: {0}")]
    Blob(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Logs the underlying driver error and collapses it into `CoreError::Storage`.
pub fn storage_err<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> CoreError {
    move |e| {
        tracing::error!(op, error = %e, "record store failure");
        CoreError::Storage(op)
    }
}

/// Same as [`storage_err`] for blob backends.
pub fn blob_err<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> CoreError {
    move |e| {
        tracing::error!(op, error = %e, "blob backend failure");
        CoreError::Blob(op)
    }
}
