use std::fmt;
use std::io::Read;

use ark_types::{content_digest, Locator};
use bytes::Bytes;

use crate::config::ResolverSettings;
use crate::error::ResolveResult;

/// Readable payload handed out by stream lookups.
pub type ArtifactStream = Box<dyn Read + Send>;

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// A resolved definition payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Definition {
    /// Symbolic name the definition was requested under.
    pub name: String,
    /// Store path the payload was read from.
    pub path: String,
    pub bytes: Bytes,
    /// Name of the resolver that answered.
    pub origin: String,
}

impl Definition {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        bytes: Bytes,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            bytes,
            origin: origin.into(),
        }
    }

    /// BLAKE3 hex digest of the payload.
    pub fn digest(&self) -> String {
        content_digest(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("size", &self.bytes.len())
            .field("origin", &self.origin)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Resolver trait
// ---------------------------------------------------------------------------

/// One link of a [`crate::ResolverChain`].
///
/// Each lookup returns `Ok(None)` when the resolver has no answer, which lets
/// the chain move on to the next resolver. Errors abort the whole lookup.
pub trait Resolver: Send + Sync {
    /// Stable identifier, e.g. `"local"`.
    fn name(&self) -> &str;

    fn settings(&self) -> &ResolverSettings;

    /// Resolve a symbolic definition name. With `eager`, the definition is
    /// also linked before it is returned.
    fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>>;

    /// Open a resource by its path.
    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>>;

    /// Point at a resource inside its originating archive.
    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>>;

    fn is_enabled(&self) -> bool {
        self.settings().is_enabled()
    }

    fn priority(&self) -> i32 {
        self.settings().priority()
    }
}

/// Hook run on a definition the first time it is resolved eagerly.
pub trait Linker: Send + Sync {
    fn link(&self, definition: &Definition) -> ResolveResult<()>;
}
