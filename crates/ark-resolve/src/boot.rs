use std::sync::Arc;

use ark_types::Locator;

use crate::config::{ResolverSettings, BOOT, BOOT_PRIORITY};
use crate::error::ResolveResult;
use crate::filter::{DelegationConfig, DelegationFilter};
use crate::resolver::{ArtifactStream, Definition, Resolver};

/// The privileged override of a chain.
///
/// For names accepted by its [`DelegationFilter`] it asks the target
/// resolver (normally the parent); every other name gets no answer.
pub struct BootDelegationResolver {
    settings: ResolverSettings,
    filter: DelegationFilter,
    target: Arc<dyn Resolver>,
}

impl BootDelegationResolver {
    pub fn new(config: &DelegationConfig, filter: DelegationFilter, target: Arc<dyn Resolver>) -> Self {
        Self {
            settings: ResolverSettings::new(config.enabled, BOOT_PRIORITY),
            filter,
            target,
        }
    }

    /// Build the filter from `config` as well.
    pub fn from_config(config: &DelegationConfig, target: Arc<dyn Resolver>) -> ResolveResult<Self> {
        let filter = DelegationFilter::new(config)?;
        Ok(Self::new(config, filter, target))
    }

    pub fn filter(&self) -> &DelegationFilter {
        &self.filter
    }

    pub fn target(&self) -> &Arc<dyn Resolver> {
        &self.target
    }
}

impl Resolver for BootDelegationResolver {
    fn name(&self) -> &str {
        BOOT
    }

    fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn resolve(&self, name: &str, eager: bool) -> ResolveResult<Option<Definition>> {
        if !self.filter.matches(name) {
            return Ok(None);
        }
        self.target.resolve(name, eager)
    }

    fn resolve_stream(&self, name: &str) -> ResolveResult<Option<ArtifactStream>> {
        if !self.filter.matches(name) {
            return Ok(None);
        }
        self.target.resolve_stream(name)
    }

    fn resolve_locator(&self, name: &str) -> ResolveResult<Option<Locator>> {
        if !self.filter.matches(name) {
            return Ok(None);
        }
        self.target.resolve_locator(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::Fixed;

    #[test]
    fn only_filtered_names_reach_the_target() {
        let config = DelegationConfig {
            enabled: true,
            strict: false,
            patterns: vec!["com.acme.*".into()],
        };
        let boot = BootDelegationResolver::from_config(&config, Fixed::new("parent", 30, Some("p"))).unwrap();
        assert!(boot.resolve("com.acme.A", false).unwrap().is_some());
        assert!(boot.resolve("sys.Core", false).unwrap().is_some());
        assert!(boot.resolve("org.B", false).unwrap().is_none());
        assert!(boot.resolve_locator("org.B").unwrap().is_none());
        assert!(boot.is_enabled());
        assert_eq!(boot.priority(), 0);
    }

    #[test]
    fn enabled_follows_config() {
        let boot = BootDelegationResolver::from_config(
            &DelegationConfig::default(),
            Fixed::new("parent", 30, None),
        )
        .unwrap();
        assert!(!boot.is_enabled());
    }
}
