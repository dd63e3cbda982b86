use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{SdkError, SdkResult};
use crate::loader::ArtifactLoader;

/// Name the default loader is registered under.
pub const DEFAULT_LOADER: &str = "ark";

static LIVE: AtomicBool = AtomicBool::new(false);

/// Named registry of loaders.
///
/// At most one context is live per process. It stays live until
/// [`LoaderContext::destroy`] is called or it is dropped.
pub struct LoaderContext {
    loaders: RwLock<BTreeMap<String, Arc<ArtifactLoader>>>,
}

impl LoaderContext {
    /// Claim the process-wide slot with `default` registered as
    /// [`DEFAULT_LOADER`].
    pub fn create(default: Arc<ArtifactLoader>) -> SdkResult<Self> {
        if LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SdkError::AlreadyLoaded);
        }
        let mut loaders = BTreeMap::new();
        loaders.insert(DEFAULT_LOADER.to_string(), default);
        tracing::debug!("loader context created");
        Ok(Self {
            loaders: RwLock::new(loaders),
        })
    }

    pub fn is_live() -> bool {
        LIVE.load(Ordering::Acquire)
    }

    pub fn add_loader(&self, name: impl Into<String>, loader: Arc<ArtifactLoader>) -> SdkResult<()> {
        let name = name.into();
        let mut loaders = self.loaders.write().expect("lock poisoned");
        if loaders.contains_key(&name) {
            return Err(SdkError::DuplicateLoader(name));
        }
        tracing::debug!(%name, loader = %loader.id(), "registering loader");
        loaders.insert(name, loader);
        Ok(())
    }

    pub fn loader(&self, name: &str) -> Option<Arc<ArtifactLoader>> {
        self.loaders.read().expect("lock poisoned").get(name).cloned()
    }

    pub fn default_loader(&self) -> Arc<ArtifactLoader> {
        let loaders = self.loaders.read().expect("lock poisoned");
        Arc::clone(&loaders[DEFAULT_LOADER])
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.loaders.read().expect("lock poisoned").keys().cloned().collect()
    }

    /// Release the process-wide slot.
    pub fn destroy(self) {}
}

impl Drop for LoaderContext {
    fn drop(&mut self) {
        LIVE.store(false, Ordering::Release);
        tracing::debug!("loader context destroyed");
    }
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderContext")
            .field("loaders", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArkConfig;

    fn loader() -> Arc<ArtifactLoader> {
        Arc::new(ArtifactLoader::new(&ArkConfig::default()).unwrap())
    }

    // The slot is process-wide, so the whole lifecycle lives in one test.
    #[test]
    fn context_lifecycle() {
        let default = loader();
        let context = LoaderContext::create(Arc::clone(&default)).unwrap();
        assert!(LoaderContext::is_live());
        assert!(matches!(LoaderContext::create(loader()), Err(SdkError::AlreadyLoaded)));

        assert_eq!(context.default_loader().id(), default.id());
        context.add_loader("plugins", loader()).unwrap();
        assert!(matches!(
            context.add_loader("plugins", loader()),
            Err(SdkError::DuplicateLoader(ref n)) if n == "plugins"
        ));
        assert!(matches!(
            context.add_loader(DEFAULT_LOADER, loader()),
            Err(SdkError::DuplicateLoader(_))
        ));
        assert_eq!(context.names(), vec!["ark", "plugins"]);
        assert!(context.loader("plugins").is_some());
        assert!(context.loader("absent").is_none());

        context.destroy();
        assert!(!LoaderContext::is_live());

        // Dropping releases the slot as well.
        {
            let _again = LoaderContext::create(loader()).unwrap();
        }
        let last = LoaderContext::create(loader()).unwrap();
        assert_eq!(last.names(), vec!["ark"]);
    }
}
