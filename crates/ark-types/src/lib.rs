//! Foundation types for ark, the artifact resolution kit.
//!
//! Every other ark crate depends on `ark-types`. The types here are small,
//! cheap to clone, and carry no I/O.
//!
//! # Key Types
//!
//! - [`DefinitionNaming`] -- maps symbolic definition names (`com.acme.Widget`)
//!   to store paths (`com/acme/Widget.def`)
//! - [`Locator`] -- structured pointer to an artifact inside an archive
//! - [`ResourceKind`] -- coarse classification of an artifact name
//!
//! Artifact names are plain `String`s; [`normalize_name`] turns any incoming
//! path into the canonical forward-slash form used as a store key.

pub mod digest;
pub mod error;
pub mod kind;
pub mod locator;
pub mod names;

pub use digest::content_digest;
pub use error::{TypeError, TypeResult};
pub use kind::ResourceKind;
pub use locator::Locator;
pub use names::{is_blank, join_package, normalize_name, DefinitionNaming, DEFAULT_DEFINITION_EXTENSION};
