use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

use ark_store::{ArtifactStore, StoreError};
use ark_types::{DefinitionNaming, Locator};

use crate::config::{ResolverSettings, LOCAL};
use crate::error::ResolveResult;
use crate::resolver::{ArtifactStream, Definition, Linker, Resolver};

#[derive(Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Unlinked,
    Linking,
    Linked,
}

struct CachedDefinition {
    definition: Definition,
    link: LinkState,
}

/// Answers lookups from an [`ArtifactStore`].
///
/// Resolved definitions are cached by symbolic name, so repeated lookups
/// hand back the same definition until it is evicted.
///
/// The linker runs without the cache lock held, so it may resolve other
/// definitions through this resolver. An eager lookup that arrives while the
/// same definition is being linked returns without waiting for the link.
pub struct LocalResolver {
    settings: ResolverSettings,
    store: Arc<dyn ArtifactStore>,
    naming: DefinitionNaming,
    linker: Option<Arc<dyn Linker>>,
    cache: RwLock<HashMap<String, CachedDefinition>>,
}

impl LocalResolver {
    pub fn new(store: Arc<dyn ArtifactStore>, naming: DefinitionNaming, settings: ResolverSettings) -> Self {
        Self {
            settings,
            store,
            naming,
            linker: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Run `linker` on definitions resolved with `eager`.
    pub fn with_linker(mut self, linker: Arc<dyn Linker>) -> Self {
        self.linker = Some(linker);
        self
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn naming(&self) -> &DefinitionNaming {
        &self.naming
    }

    /// Drop a cached definition. Returns it if it was cached.
    pub fn evict(&self, name: &str) -> Option<Definition> {
        self.cache
            .write()
            .expect("lock poisoned")
            .remove(name)
            .map(|c| c.definition)
    }

    /// Symbolic names of the cached definitions, sorted.
    pub fn cached(&self) -> Vec<String> {
        let cache = self.cache.read().expect("lock poisoned");
        let mut names: Vec<String> = cache.keys().cloned().collect();
        names.sort();
        names
    }

    fn link_once(&self, name: &str) -> ResolveResult<()> {
        let Some(linker) = &self.linker else {
            return Ok(());
        };
        let definition = {
            let mut cache = self.cache.write().expect("lock poisoned");
            match cache.get_mut(name) {
                Some(entry) if entry.link == LinkState::Unlinked => {
                    entry.link = LinkState::Linking;
                    entry.definition.clone()
                }
                _ => return Ok(()),
            }
        };

        let linked = linker.link(&definition);
        let state = if linked.is_ok() {
            LinkState::Linked
        } else {
            LinkState::Unlinked
        };
        if let Some(entry) = self.cache.write().expect("lock poisoned").get_mut(name) {
            entry.link = state;
        }
        linked?;
        tracing::trace!(%name, "linked definition");
        Ok(())
    }
}

impl Resolver for LocalResolver {
    fn name(&self) -> &str {
        LOCAL
    }

    fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>> {
        let cached = self
            .cache
            .read()
            .expect("lock poisoned")
            .get(name)
            .map(|c| c.definition.clone());

        let definition = match cached {
            Some(def) => def,
            None => {
                let path = self.naming.to_path(name);
                let Some(bytes) = no_answer_on_invalid(self.store.get(&path))? else {
                    return Ok(None);
                };
                let def = Definition::new(name, path, bytes, LOCAL);
                let mut cache = self.cache.write().expect("lock poisoned");
                // A concurrent lookup may have won; keep its entry.
                cache
                    .entry(name.to_string())
                    .or_insert_with(|| CachedDefinition {
                        definition: def,
                        link: LinkState::Unlinked,
                    })
                    .definition
                    .clone()
            }
        };

        if eager {
            self.link_once(name)?;
        }
        tracing::trace!(%name, "local definition hit");
        Ok(Some(definition))
    }

    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        Ok(no_answer_on_invalid(self.store.get(name))?
            .map(|bytes| Box::new(Cursor::new(bytes)) as ArtifactStream))
    }

    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        match self.store.locate(name) {
            Ok(found) => Ok(found),
            Err(StoreError::NoBaseLocator(_) | StoreError::InvalidName(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// A name the store cannot hold (e.g. `"/"`) is simply not here.
fn no_answer_on_invalid<T>(result: Result<Option<T>, StoreError>) -> ResolveResult<Option<T>> {
    match result {
        Err(StoreError::InvalidName(_)) => Ok(None),
        other => Ok(other?),
    }
}
