//! Name-keyed artifact storage for ark.
//!
//! An artifact store maps normalized artifact names (forward-slash paths such
//! as `com/acme/Widget.def` or `conf/app.toml`) to immutable payload bytes.
//! Archives and loose files are ingested into a store by `ark-archive`; the
//! local resolver in `ark-resolve` answers lookups from it.
//!
//! # Storage Backends
//!
//! All backends implement the [`ArtifactStore`] trait:
//!
//! - [`InMemoryArtifactStore`] -- `HashMap`-based store behind a `RwLock`
//!
//! # Design Rules
//!
//! 1. Payloads are immutable once written; only an explicit remove drops them.
//! 2. A name is stored at most once. A second write of the same name either
//!    fails with [`StoreError::Collision`] or is skipped, depending on the
//!    [`CollisionPolicy`]. The first payload always stays.
//! 3. Concurrent reads are always safe; writes are serialized by the store.
//! 4. Names are normalized on every operation, so `./a/b` and `a//b` address
//!    the same artifact.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use config::{CollisionPolicy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryArtifactStore;
pub use traits::ArtifactStore;
