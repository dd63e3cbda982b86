//! Object graph cloning for ark.
//!
//! [`ObjectGraphCloner`] copies a value together with every shared node
//! (`Rc`, `Arc`) reachable from it. Each node is copied once per call, so
//! diamonds and cycles come out with the same shape as the original.
//!
//! Types opt in through [`DeepClone`]. Plain structs use
//! [`deep_clone_struct!`]; value-like enums use [`deep_clone_immutable!`].
//! Cycles need a node the cloner can register empty before it copies the
//! contents: an interior-mutable cell (`RefCell`, `Mutex`, `RwLock`) around
//! a `Default` type, or a struct declared with
//! `deep_clone_struct!(T { .. } with shell)`. A cycle through any other
//! shared node fails with [`CloneError::Cycle`].
//!
//! In shallow mode only the root is copied and shared nodes below it are
//! reused.

pub mod cloner;
pub mod error;
pub mod impls;
pub mod session;
pub mod shared;
pub mod traits;

pub use cloner::{deep_clone, shallow_clone, ObjectGraphCloner};
pub use error::{CloneError, CloneResult};
pub use session::{CloneMode, CloneSession};
pub use traits::{DeepClone, SharedRef};
