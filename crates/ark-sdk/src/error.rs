use ark_archive::IngestError;
use ark_proxy::ProxyError;
use ark_resolve::ResolveError;
use ark_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("artifact {0} does not belong to this loader")]
    NotLoaded(String),

    #[error("instantiating {name} failed: {reason}")]
    Instantiate { name: String, reason: String },

    #[error("a loader context is already live in this process")]
    AlreadyLoaded,

    #[error("a loader named {0} is already registered")]
    DuplicateLoader(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: String, value: String },

    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
