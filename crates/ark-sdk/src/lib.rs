//! High-level API for ark.
//!
//! - [`ArtifactLoader`] ties a store, an ingester and a resolver chain
//!   together with the default resolver set.
//! - [`ObjectFactory`] turns resolved definitions into objects through a
//!   host [`Instantiator`], optionally wrapping them in proxies.
//! - [`LoaderContext`] is the process-wide registry of named loaders.
//! - [`ArkConfig`] gathers every setting; it loads from TOML and `ARK_*`
//!   environment variables.
//!
//! ```no_run
//! use ark_sdk::{ArkConfig, ArtifactLoader};
//!
//! let config = ArkConfig::from_env()?;
//! let loader = ArtifactLoader::new(&config)?;
//! loader.add("plugins/widgets.tar.gz")?;
//! let widget = loader.resolve("com.acme.Widget", false)?;
//! # Ok::<(), ark_sdk::SdkError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod loader;

pub use config::{ArkConfig, ENV_PREFIX};
pub use context::{LoaderContext, DEFAULT_LOADER};
pub use error::{SdkError, SdkResult};
pub use factory::{Instantiator, ObjectFactory};
pub use loader::{ArtifactLoader, LoaderHosts};
