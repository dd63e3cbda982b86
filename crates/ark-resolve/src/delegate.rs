use std::sync::Arc;

use ark_types::Locator;

use crate::chain::ResolverChain;
use crate::config::{ResolverSettings, DELEGATE};
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::{ArtifactStream, Definition, Resolver};

/// Forwards lookups to another [`ResolverChain`].
///
/// A `NotFound` from the other chain is "no answer" here, so the outer chain
/// keeps scanning.
pub struct DelegateResolver {
    settings: ResolverSettings,
    chain: Arc<ResolverChain>,
}

impl DelegateResolver {
    pub fn new(chain: Arc<ResolverChain>, settings: ResolverSettings) -> Self {
        Self { settings, chain }
    }

    pub fn chain(&self) -> &Arc<ResolverChain> {
        &self.chain
    }
}

fn absorb_not_found<T>(result: ResolveResult<Option<T>>) -> ResolveResult<Option<T>> {
    match result {
        Err(ResolveError::NotFound { .. }) => Ok(None),
        other => other,
    }
}

impl Resolver for DelegateResolver {
    fn name(&self) -> &str {
        DELEGATE
    }

    fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>> {
        absorb_not_found(self.chain.resolve(name, eager))
    }

    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        absorb_not_found(self.chain.resolve_stream(name))
    }

    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        absorb_not_found(self.chain.resolve_locator(name))
    }
}
