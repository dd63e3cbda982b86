//! Resolver chain for ark.
//!
//! A [`ResolverChain`] answers three kinds of lookup for a name: a
//! [`Definition`], a readable stream, and a [`ark_types::Locator`]. It
//! consults its resolvers in ascending priority order and returns the first
//! answer.
//!
//! # Resolvers
//!
//! | Name        | Type                       | Default priority | Enabled |
//! |-------------|----------------------------|------------------|---------|
//! | `composite` | [`CompositeResolver`]      | 5                | yes     |
//! | `local`     | [`LocalResolver`]          | 10               | yes     |
//! | `delegate`  | [`DelegateResolver`]       | 15               | yes     |
//! | `current`   | [`HostResolver`]           | 20               | yes     |
//! | `parent`    | [`HostResolver`]           | 30               | yes     |
//! | `thread`    | [`HostResolver`]           | 40               | no      |
//! | `system`    | [`HostResolver`]           | 50               | yes     |
//!
//! The boot delegation override ([`BootDelegationResolver`]) sits outside the
//! sorted set. For names its [`DelegationFilter`] accepts, it is asked first.
//! In strict mode a miss there is final.

pub mod boot;
pub mod chain;
pub mod composite;
pub mod config;
pub mod context;
pub mod delegate;
pub mod error;
pub mod filter;
pub mod host;
pub mod local;
pub mod resolver;

pub use boot::BootDelegationResolver;
pub use chain::ResolverChain;
pub use composite::CompositeResolver;
pub use config::{ChainConfig, ResolverConfig, ResolverSettings};
pub use context::{ContextGuard, ExecutionContext};
pub use delegate::DelegateResolver;
pub use error::{ResolveError, ResolveResult};
pub use filter::{parse_patterns, DelegationConfig, DelegationFilter, RESERVED_PREFIX};
pub use host::{DirectoryHost, HostKind, HostResolver, HostRuntime, NullHost};
pub use local::LocalResolver;
pub use resolver::{ArtifactStream, Definition, Linker, Resolver};
