use std::sync::{Arc, RwLock};

use crate::dynamic::{Dynamic, Proxy};
use crate::error::ProxyResult;
use crate::provider::{ProxyBackend, ProxyProvider};
use crate::types::{TypeInfo, TypeRegistry};

/// Creates proxies through a swappable [`ProxyProvider`].
pub struct ProxyFactory {
    provider: RwLock<Arc<dyn ProxyProvider>>,
}

impl ProxyFactory {
    pub fn new(backend: ProxyBackend) -> Self {
        Self::with_provider(backend.provider())
    }

    pub fn with_provider(provider: Arc<dyn ProxyProvider>) -> Self {
        Self {
            provider: RwLock::new(provider),
        }
    }

    /// Switch to a built-in backend for subsequent proxies.
    pub fn set_backend(&self, backend: ProxyBackend) {
        self.set_provider(backend.provider());
    }

    pub fn set_provider(&self, provider: Arc<dyn ProxyProvider>) {
        tracing::debug!(provider = provider.name(), "switching proxy provider");
        *self.provider.write().expect("lock poisoned") = provider;
    }

    pub fn provider(&self) -> Arc<dyn ProxyProvider> {
        Arc::clone(&self.provider.read().expect("lock poisoned"))
    }

    pub fn create(
        &self,
        object: Arc<dyn Dynamic>,
        base: Option<Arc<TypeInfo>>,
        capabilities: &[Arc<TypeInfo>],
        context: Option<&TypeRegistry>,
    ) -> ProxyResult<Arc<Proxy>> {
        self.provider().create_proxy(object, base, capabilities, context)
    }

    /// Proxy exposing exactly one capability.
    pub fn cast(&self, object: Arc<dyn Dynamic>, capability: &Arc<TypeInfo>) -> ProxyResult<Arc<Proxy>> {
        self.create(object, None, std::slice::from_ref(capability), None)
    }

    /// Like [`Self::cast`], resolving the capability by name in `registry`.
    pub fn cast_in(
        &self,
        object: Arc<dyn Dynamic>,
        capability: &Arc<TypeInfo>,
        registry: &TypeRegistry,
    ) -> ProxyResult<Arc<Proxy>> {
        self.create(object, None, std::slice::from_ref(capability), Some(registry))
    }
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new(ProxyBackend::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::error::ProxyError;
    use crate::provider::tests::{greeter, English};

    #[test]
    fn default_backend_is_interface() {
        let factory = ProxyFactory::default();
        assert_eq!(factory.provider().name(), "interface");
        let proxy = factory.cast(English::new(), &greeter()).unwrap();
        assert_eq!(proxy.invoke("greet", &[json!("Di")]).unwrap(), json!("Hello, Di"));
    }

    #[test]
    fn backend_swaps_at_runtime() {
        let factory = ProxyFactory::default();
        let concrete = Arc::new(TypeInfo::concrete("Speaker"));
        assert!(factory.create(English::new(), Some(concrete.clone()), &[], None).is_err());

        factory.set_backend(ProxyBackend::Extension);
        let proxy = factory.create(English::new(), Some(concrete), &[], None).unwrap();
        assert_eq!(proxy.backend(), "extension");
    }

    #[test]
    fn cast_in_uses_registry() {
        let factory = ProxyFactory::default();
        let registry = TypeRegistry::new();
        let err = factory.cast_in(English::new(), &greeter(), &registry).unwrap_err();
        assert_eq!(err, ProxyError::UnknownType("Greeter".into()));
    }
}
