use ark_store::StoreError;
use ark_types::ResourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{kind} not found: {name}")]
    NotFound { name: String, kind: ResourceKind },

    #[error("boot delegation is strict and the override resolver has no answer for {0}")]
    DelegationMiss(String),

    #[error("invalid delegation pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("linking {name} failed: {reason}")]
    Link { name: String, reason: String },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
