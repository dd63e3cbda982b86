use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("artifact name must not be blank")]
    BlankName,

    #[error("invalid locator {0:?}: expected archive:<base>!/<entry>")]
    InvalidLocator(String),

    #[error("invalid definition extension {0:?}")]
    InvalidExtension(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
