use std::sync::{Arc, RwLock};

use ark_types::Locator;

use crate::config::{ResolverSettings, COMPOSITE};
use crate::error::ResolveResult;
use crate::resolver::{ArtifactStream, Definition, Resolver};

/// A group of resolvers consulted in insertion order.
///
/// Members' own priorities are ignored; disabled members are skipped.
pub struct CompositeResolver {
    settings: ResolverSettings,
    members: RwLock<Vec<Arc<dyn Resolver>>>,
}

impl CompositeResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            members: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, resolver: Arc<dyn Resolver>) {
        self.members.write().expect("lock poisoned").push(resolver);
    }

    pub fn members(&self) -> Vec<Arc<dyn Resolver>> {
        self.members.read().expect("lock poisoned").clone()
    }

    fn first<T>(&self, op: impl Fn(&dyn Resolver) -> ResolveResult<Option<T>>) -> ResolveResult<Option<T>> {
        for member in self.members() {
            if !member.is_enabled() {
                continue;
            }
            if let Some(hit) = op(member.as_ref())? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }
}

impl Resolver for CompositeResolver {
    fn name(&self) -> &str {
        COMPOSITE
    }

    fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>> {
        self.first(|r| r.resolve(name, eager))
    }

    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        self.first(|r| r.resolve_stream(name))
    }

    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        self.first(|r| r.resolve_locator(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::Fixed;

    #[test]
    fn insertion_order_beats_member_priority() {
        let group = CompositeResolver::new(ResolverSettings::new(true, 5));
        group.add(Fixed::new("slow", 99, Some("slow")));
        group.add(Fixed::new("fast", 1, Some("fast")));
        assert_eq!(group.resolve("X", false).unwrap().unwrap().origin, "slow");
    }

    #[test]
    fn skips_disabled_and_empty_members() {
        let group = CompositeResolver::new(ResolverSettings::new(true, 5));
        let off = Fixed::new("off", 1, Some("off"));
        off.settings().set_enabled(false);
        group.add(off);
        group.add(Fixed::new("none", 2, None));
        assert!(group.resolve("X", false).unwrap().is_none());
        group.add(Fixed::new("on", 3, Some("on")));
        assert_eq!(group.resolve_locator("x").unwrap().unwrap().base, "on");
        assert_eq!(group.members().len(), 3);
    }
}
