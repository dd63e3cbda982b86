//! Capability proxies for ark.
//!
//! Objects produced by a host are [`Dynamic`]: they describe themselves with
//! a [`TypeInfo`] and accept calls by method name with `serde_json::Value`
//! arguments. A [`Proxy`] wraps such an object and exposes only a chosen
//! capability set, forwarding declared calls unchanged.
//!
//! Two providers are built in:
//!
//! - [`InterfaceProxyProvider`] -- interfaces only (the default)
//! - [`ExtensionProxyProvider`] -- may also extend a concrete base type
//!
//! [`ProxyFactory`] holds the active provider and can switch it at runtime.

pub mod dynamic;
pub mod error;
pub mod factory;
pub mod provider;
pub mod types;

pub use dynamic::{Dynamic, Proxy};
pub use error::{ProxyError, ProxyResult};
pub use factory::ProxyFactory;
pub use provider::{ExtensionProxyProvider, InterfaceProxyProvider, ProxyBackend, ProxyProvider};
pub use types::{MethodSig, ParamType, TypeInfo, TypeKind, TypeRegistry};
