use std::path::PathBuf;

use ark_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("file/path does not exist: {0}")]
    Missing(PathBuf),

    #[error("remote fetch failed for {url}: {source}")]
    Remote { url: String, source: reqwest::Error },

    #[error("invalid source locator: {0}")]
    InvalidUrl(String),

    #[error("store rejected entry: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Adapter for `map_err` that wraps an I/O error with context.
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
