use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ark_types::{normalize_name, DefinitionNaming, Locator};
use bytes::Bytes;
use url::Url;

use crate::config::{ResolverSettings, CURRENT, PARENT, SYSTEM, THREAD};
use crate::context::ExecutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::{ArtifactStream, Definition, Resolver};

// ---------------------------------------------------------------------------
// HostRuntime
// ---------------------------------------------------------------------------

/// The hosting environment's own artifact lookup.
///
/// Paths passed in are already normalized store paths.
pub trait HostRuntime: Send + Sync {
    fn fetch(&self, path: &str) -> ResolveResult<Option<Bytes>>;

    fn locate(&self, path: &str) -> ResolveResult<Option<Locator>>;

    fn open(&self, path: &str) -> ResolveResult<Option<ArtifactStream>> {
        Ok(self
            .fetch(path)?
            .map(|bytes| Box::new(Cursor::new(bytes)) as ArtifactStream))
    }
}

/// A host that knows nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl HostRuntime for NullHost {
    fn fetch(&self, _path: &str) -> ResolveResult<Option<Bytes>> {
        Ok(None)
    }

    fn locate(&self, _path: &str) -> ResolveResult<Option<Locator>> {
        Ok(None)
    }
}

/// A host that searches a list of root directories in order.
#[derive(Clone, Debug, Default)]
pub struct DirectoryHost {
    roots: Vec<PathBuf>,
}

impl DirectoryHost {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn find(&self, path: &str) -> Option<(&Path, PathBuf)> {
        let path = normalize_name(path).ok()?;
        if path.split('/').any(|segment| segment == "..") {
            return None;
        }
        self.roots.iter().find_map(|root| {
            let candidate = root.join(&path);
            candidate.is_file().then(|| (root.as_path(), candidate))
        })
    }
}

impl HostRuntime for DirectoryHost {
    fn fetch(&self, path: &str) -> ResolveResult<Option<Bytes>> {
        let Some((_, file)) = self.find(path) else {
            return Ok(None);
        };
        let bytes = fs::read(&file).map_err(|source| ResolveError::Io {
            context: format!("reading {}", file.display()),
            source,
        })?;
        Ok(Some(Bytes::from(bytes)))
    }

    fn locate(&self, path: &str) -> ResolveResult<Option<Locator>> {
        Ok(self.find(path).map(|(root, file)| {
            let base = Url::from_directory_path(root)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("file://{}", root.display()));
            let entry = file
                .strip_prefix(root)
                .unwrap_or(&file)
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            Locator::new(base, entry)
        }))
    }
}

// ---------------------------------------------------------------------------
// HostResolver
// ---------------------------------------------------------------------------

/// Which host-backed resolver this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// The environment default.
    System,
    /// The caller's own context.
    Current,
    Parent,
    /// Whatever host the current thread entered through [`ExecutionContext`].
    Thread,
}

impl HostKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::System => SYSTEM,
            Self::Current => CURRENT,
            Self::Parent => PARENT,
            Self::Thread => THREAD,
        }
    }
}

/// Resolver backed by a [`HostRuntime`].
pub struct HostResolver {
    kind: HostKind,
    settings: ResolverSettings,
    naming: DefinitionNaming,
    host: Option<Arc<dyn HostRuntime>>,
}

impl HostResolver {
    /// A resolver over a fixed host. For [`HostKind::Thread`] use
    /// [`Self::thread`] instead.
    pub fn new(
        kind: HostKind,
        host: Arc<dyn HostRuntime>,
        naming: DefinitionNaming,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            kind,
            settings,
            naming,
            host: Some(host),
        }
    }

    /// A resolver that asks the host installed on the calling thread.
    pub fn thread(naming: DefinitionNaming, settings: ResolverSettings) -> Self {
        Self {
            kind: HostKind::Thread,
            settings,
            naming,
            host: None,
        }
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    fn host(&self) -> Option<Arc<dyn HostRuntime>> {
        match &self.host {
            Some(host) => Some(Arc::clone(host)),
            None => ExecutionContext::current(),
        }
    }
}

impl Resolver for HostResolver {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn resolve(&self, name: &str, _eager: bool) -> ResolveResult<Option<Definition>> {
        let Some(host) = self.host() else {
            return Ok(None);
        };
        let path = self.naming.to_path(name);
        Ok(host
            .fetch(&path)?
            .map(|bytes| Definition::new(name, path, bytes, self.kind.name())))
    }

    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        match self.host() {
            Some(host) => host.open(name),
            None => Ok(None),
        }
    }

    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        match self.host() {
            Some(host) => host.locate(name),
            None => Ok(None),
        }
    }
}
