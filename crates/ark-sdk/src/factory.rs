use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ark_proxy::{Dynamic, ProxyBackend, ProxyError, ProxyFactory};
use ark_resolve::{Definition, ResolveError};
use ark_types::ResourceKind;
use serde_json::Value;

use crate::config::ArkConfig;
use crate::error::SdkResult;
use crate::loader::ArtifactLoader;

/// Turns a resolved definition into a live object.
///
/// With a `factory_method`, the host calls that static entry point instead
/// of the default constructor.
pub trait Instantiator: Send + Sync {
    fn instantiate(
        &self,
        definition: &Definition,
        factory_method: Option<&str>,
        args: &[Value],
    ) -> SdkResult<Arc<dyn Dynamic>>;
}

/// Creates objects from definitions resolved through an [`ArtifactLoader`].
pub struct ObjectFactory {
    instantiator: Arc<dyn Instantiator>,
    proxies: ProxyFactory,
    auto_proxy: AtomicBool,
}

impl ObjectFactory {
    pub fn new(instantiator: Arc<dyn Instantiator>, auto_proxy: bool, backend: ProxyBackend) -> Self {
        Self {
            instantiator,
            proxies: ProxyFactory::new(backend),
            auto_proxy: AtomicBool::new(auto_proxy),
        }
    }

    pub fn from_config(instantiator: Arc<dyn Instantiator>, config: &ArkConfig) -> Self {
        Self::new(instantiator, config.auto_proxy, config.proxy_backend)
    }

    pub fn proxies(&self) -> &ProxyFactory {
        &self.proxies
    }

    pub fn auto_proxy(&self) -> bool {
        self.auto_proxy.load(Ordering::Relaxed)
    }

    pub fn set_auto_proxy(&self, enabled: bool) {
        self.auto_proxy.store(enabled, Ordering::Relaxed);
    }

    /// Instantiate `name` through its default constructor.
    pub fn create(&self, loader: &ArtifactLoader, name: &str, args: &[Value]) -> SdkResult<Arc<dyn Dynamic>> {
        self.build(loader, name, None, args)
    }

    /// Instantiate `name` through a named static factory method.
    pub fn create_via(
        &self,
        loader: &ArtifactLoader,
        name: &str,
        factory_method: &str,
        args: &[Value],
    ) -> SdkResult<Arc<dyn Dynamic>> {
        self.build(loader, name, Some(factory_method), args)
    }

    fn build(
        &self,
        loader: &ArtifactLoader,
        name: &str,
        factory_method: Option<&str>,
        args: &[Value],
    ) -> SdkResult<Arc<dyn Dynamic>> {
        let definition = loader.resolve(name, true)?.ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
            kind: ResourceKind::Definition,
        })?;

        let object = self.instantiator.instantiate(&definition, factory_method, args)?;
        tracing::debug!(%name, origin = %definition.origin, "instantiated");

        if self.auto_proxy() {
            return self.wrap(object);
        }
        Ok(object)
    }

    /// Proxy exposing the object's base type and all of its interfaces.
    fn wrap(&self, object: Arc<dyn Dynamic>) -> SdkResult<Arc<dyn Dynamic>> {
        let info = object.type_info();
        if info.base.is_none() && info.interfaces.is_empty() {
            return Err(ProxyError::NothingToExpose(info.name.clone()).into());
        }
        let base = info.base.clone();
        let interfaces = info.interfaces.clone();
        let proxy = self.proxies.create(object, base, &interfaces, None)?;
        Ok(proxy as Arc<dyn Dynamic>)
    }
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("provider", &self.proxies.provider().name())
            .field("auto_proxy", &self.auto_proxy())
            .finish()
    }
}
