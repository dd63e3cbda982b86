use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("cannot create a proxy without capabilities")]
    EmptyCapabilities,

    #[error("{0} is not an interface")]
    NotInterface(String),

    #[error("type {0} is not known to the registry")]
    UnknownType(String),

    #[error("object of type {0} exposes neither a base type nor interfaces")]
    NothingToExpose(String),

    #[error("method {method} is not declared on proxy {proxy}")]
    NotDeclared { method: String, proxy: String },

    #[error("type {type_name} has no method {method} with matching parameters")]
    NoSuchMethod { type_name: String, method: String },

    #[error("invoking {method} failed: {reason}")]
    Invocation { method: String, reason: String },
}

pub type ProxyResult<T> = Result<T, ProxyError>;
