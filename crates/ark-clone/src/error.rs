use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CloneError {
    #[error("shared value of type {type_name} is already mutably borrowed")]
    Borrowed { type_name: &'static str },

    #[error("lock on shared value of type {type_name} is poisoned")]
    Poisoned { type_name: &'static str },

    #[error("identity map holds a different type for {type_name}")]
    TypeMismatch { type_name: &'static str },

    #[error("type {type_name} cannot be filled in place")]
    NotACell { type_name: &'static str },

    #[error("cycle through shared value of type {type_name}, which has no shell")]
    Cycle { type_name: &'static str },
}

pub type CloneResult<T> = Result<T, CloneError>;
