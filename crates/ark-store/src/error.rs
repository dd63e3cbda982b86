use ark_types::TypeError;

/// Errors from artifact store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested artifact was not found.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// An artifact with this name is already stored and collisions raise.
    #[error("artifact {0} already loaded")]
    Collision(String),

    /// Locators need a base (the originating archive), and none is known.
    #[error("no base locator: {0} is not addressable by locator")]
    NoBaseLocator(String),

    /// The artifact name is malformed.
    #[error("invalid artifact name: {0}")]
    InvalidName(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
