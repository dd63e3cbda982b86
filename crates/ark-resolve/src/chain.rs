use std::sync::{Arc, RwLock};

use ark_types::{is_blank, DefinitionNaming, Locator, ResourceKind};

use crate::boot::BootDelegationResolver;
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::{ArtifactStream, Definition, Resolver};

/// Ordered set of resolvers plus the boot delegation override.
///
/// The set is re-sorted by ascending priority before every lookup; resolvers
/// with equal priority keep insertion order. The chain never drops a
/// resolver on its own.
pub struct ResolverChain {
    resolvers: RwLock<Vec<(u64, Arc<dyn Resolver>)>>,
    boot: RwLock<Option<Arc<BootDelegationResolver>>>,
    naming: DefinitionNaming,
}

impl ResolverChain {
    pub fn new(naming: DefinitionNaming) -> Self {
        Self {
            resolvers: RwLock::new(Vec::new()),
            boot: RwLock::new(None),
            naming,
        }
    }

    pub fn naming(&self) -> &DefinitionNaming {
        &self.naming
    }

    /// Append a resolver.
    pub fn add(&self, resolver: Arc<dyn Resolver>) {
        let mut resolvers = self.resolvers.write().expect("lock poisoned");
        let seq = resolvers.len() as u64;
        tracing::debug!(resolver = resolver.name(), priority = resolver.priority(), "adding resolver");
        resolvers.push((seq, resolver));
    }

    /// Install (or clear) the boot delegation override.
    pub fn set_override(&self, boot: Option<Arc<BootDelegationResolver>>) {
        *self.boot.write().expect("lock poisoned") = boot;
    }

    pub fn override_resolver(&self) -> Option<Arc<BootDelegationResolver>> {
        self.boot.read().expect("lock poisoned").clone()
    }

    /// Snapshot of the resolvers in lookup order.
    pub fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        let mut snapshot = self.resolvers.read().expect("lock poisoned").clone();
        snapshot.sort_by_key(|(seq, r)| (r.priority(), *seq));
        snapshot.into_iter().map(|(_, r)| r).collect()
    }

    /// First resolver registered under `name`.
    pub fn find(&self, name: &str) -> Option<Arc<dyn Resolver>> {
        self.resolvers
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|(_, r)| r.name() == name)
            .map(|(_, r)| Arc::clone(r))
    }

    pub fn len(&self) -> usize {
        self.resolvers.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Resolve a symbolic definition name.
    ///
    /// Blank names yield `Ok(None)`. A name nobody answers is `NotFound`.
    pub fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>> {
        self.lookup(name, ResourceKind::Definition, |r| r.resolve(name, eager))
    }

    /// Open a resource by path.
    pub fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        let kind = ResourceKind::classify(name, &self.naming);
        self.lookup(name, kind, |r| r.resolve_stream(name))
    }

    /// Locate a resource inside its originating archive.
    pub fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        let kind = ResourceKind::classify(name, &self.naming);
        self.lookup(name, kind, |r| r.resolve_locator(name))
    }

    fn lookup<T, F>(&self, name: &str, kind: ResourceKind, op: F) -> ResolveResult<Option<T>>
    where
        F: Fn(&dyn Resolver) -> ResolveResult<Option<T>>,
    {
        if is_blank(name) {
            return Ok(None);
        }

        if let Some(boot) = self.override_resolver() {
            if boot.is_enabled() && boot.filter().matches(name) {
                if let Some(hit) = op(&*boot)? {
                    tracing::trace!(%name, resolver = boot.name(), "resolved by boot delegation");
                    return Ok(Some(hit));
                }
                if boot.filter().is_strict() {
                    return Err(ResolveError::DelegationMiss(name.to_string()));
                }
            }
        }

        for resolver in self.resolvers() {
            if !resolver.is_enabled() {
                continue;
            }
            if let Some(hit) = op(resolver.as_ref())? {
                tracing::trace!(%name, resolver = resolver.name(), "resolved");
                return Ok(Some(hit));
            }
        }

        tracing::debug!(%name, %kind, "no resolver answered");
        Err(ResolveError::NotFound {
            name: name.to_string(),
            kind,
        })
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::new(DefinitionNaming::default())
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.resolvers().iter().map(|r| r.name().to_string()).collect();
        f.debug_struct("ResolverChain")
            .field("resolvers", &names)
            .field("boot", &self.override_resolver().is_some())
            .finish()
    }
}
