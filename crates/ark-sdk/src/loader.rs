use std::collections::BTreeMap;
use std::sync::Arc;

use ark_archive::{ArchiveIngester, ArchiveSource, IngestReport};
use ark_resolve::{
    ArtifactStream, BootDelegationResolver, ChainConfig, Definition, DelegateResolver,
    DirectoryHost, HostKind, HostResolver, HostRuntime, Linker, LocalResolver, NullHost, Resolver,
    ResolverChain, ResolverSettings,
};
use ark_store::{ArtifactStore, InMemoryArtifactStore, StoreError};
use ark_types::{DefinitionNaming, Locator};
use bytes::Bytes;
use uuid::Uuid;

use crate::config::ArkConfig;
use crate::error::{SdkError, SdkResult};

// ---------------------------------------------------------------------------
// LoaderHosts
// ---------------------------------------------------------------------------

/// Host runtimes behind the `system`, `parent` and `current` resolvers.
#[derive(Clone)]
pub struct LoaderHosts {
    pub system: Arc<dyn HostRuntime>,
    pub parent: Arc<dyn HostRuntime>,
    pub current: Arc<dyn HostRuntime>,
}

impl LoaderHosts {
    /// `system` searches `roots`; `parent` and `current` know nothing.
    pub fn from_search_path(roots: &[std::path::PathBuf]) -> Self {
        Self {
            system: Arc::new(DirectoryHost::new(roots.iter().cloned())),
            parent: Arc::new(NullHost),
            current: Arc::new(NullHost),
        }
    }
}

impl Default for LoaderHosts {
    fn default() -> Self {
        Self::from_search_path(&[])
    }
}

// ---------------------------------------------------------------------------
// ArtifactLoader
// ---------------------------------------------------------------------------

/// One store, one ingester and one resolver chain with the default resolver
/// set installed.
///
/// ```text
/// boot override -> parent      (only names the delegation filter accepts)
/// local    10    store + definition cache
/// current  20    host
/// parent   30    host
/// thread   40    per-thread host (disabled by default)
/// system   50    host search path
/// ```
pub struct ArtifactLoader {
    id: Uuid,
    store: Arc<dyn ArtifactStore>,
    ingester: ArchiveIngester,
    chain: Arc<ResolverChain>,
    config: ChainConfig,
    local: Arc<LocalResolver>,
    system: Arc<HostResolver>,
    parent: Arc<HostResolver>,
    current: Arc<HostResolver>,
    thread: Arc<HostResolver>,
}

impl ArtifactLoader {
    /// A loader over a fresh in-memory store, with hosts built from the
    /// configured search path.
    pub fn new(config: &ArkConfig) -> SdkResult<Self> {
        Self::with_hosts(config, LoaderHosts::from_search_path(&config.search_path), None)
    }

    pub fn with_hosts(
        config: &ArkConfig,
        hosts: LoaderHosts,
        linker: Option<Arc<dyn Linker>>,
    ) -> SdkResult<Self> {
        let store: Arc<dyn ArtifactStore> =
            Arc::new(InMemoryArtifactStore::with_config(config.store.clone()));
        let mut ingest = config.ingest.clone();
        ingest.naming = config.chain.naming.clone();
        let ingester = ArchiveIngester::new(Arc::clone(&store), ingest);

        let chain_config = config.chain.clone();
        let naming = chain_config.naming.clone();
        let chain = Arc::new(ResolverChain::new(naming.clone()));

        let host = |kind: HostKind, runtime: Arc<dyn HostRuntime>| {
            let settings = settings_for(&chain_config, kind.name());
            Arc::new(HostResolver::new(kind, runtime, naming.clone(), settings))
        };
        let system = host(HostKind::System, hosts.system);
        let parent = host(HostKind::Parent, hosts.parent);
        let current = host(HostKind::Current, hosts.current);
        let thread = Arc::new(HostResolver::thread(
            naming.clone(),
            settings_for(&chain_config, HostKind::Thread.name()),
        ));

        let mut local = LocalResolver::new(
            Arc::clone(&store),
            naming,
            chain_config.local.into(),
        );
        if let Some(linker) = linker {
            local = local.with_linker(linker);
        }
        let local = Arc::new(local);

        let boot = BootDelegationResolver::from_config(
            &chain_config.delegation,
            Arc::clone(&parent) as Arc<dyn Resolver>,
        )?;
        chain.set_override(Some(Arc::new(boot)));

        chain.add(Arc::clone(&system) as Arc<dyn Resolver>);
        chain.add(Arc::clone(&parent) as Arc<dyn Resolver>);
        chain.add(Arc::clone(&current) as Arc<dyn Resolver>);
        chain.add(Arc::clone(&thread) as Arc<dyn Resolver>);
        chain.add(Arc::clone(&local) as Arc<dyn Resolver>);

        let id = Uuid::new_v4();
        tracing::debug!(loader = %id, resolvers = chain.len(), "artifact loader ready");

        Ok(Self {
            id,
            store,
            ingester,
            chain,
            config: chain_config,
            local,
            system,
            parent,
            current,
            thread,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // -- Ingestion -----------------------------------------------------------

    pub fn add(&self, source: impl Into<ArchiveSource>) -> SdkResult<IngestReport> {
        Ok(self.ingester.ingest(source)?)
    }

    /// Ingest every source in order. Stops at the first failure; artifacts
    /// ingested before it stay loaded.
    pub fn add_all<I, S>(&self, sources: I) -> SdkResult<IngestReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<ArchiveSource>,
    {
        Ok(self.ingester.ingest_all(sources)?)
    }

    // -- Lookup --------------------------------------------------------------

    pub fn resolve(&self, name: &str, eager: bool) -> SdkResult<Option<Definition>> {
        Ok(self.chain.resolve(name, eager)?)
    }

    pub fn resolve_stream(&self, name: &str) -> SdkResult<Option<ArtifactStream>> {
        Ok(self.chain.resolve_stream(name)?)
    }

    pub fn resolve_locator(&self, name: &str) -> SdkResult<Option<Locator>> {
        Ok(self.chain.resolve_locator(name)?)
    }

    // -- Unloading -----------------------------------------------------------

    /// Forget a definition (by symbolic name) or a resource (by path).
    ///
    /// Returns the removed payload.
    pub fn unload(&self, name: &str) -> SdkResult<Bytes> {
        self.local.evict(name);
        let path = self.naming().to_path(name);
        let removed = match self.store.remove(&path) {
            Err(StoreError::NotFound(_)) => self.store.remove(name),
            other => other,
        };
        match removed {
            Ok(bytes) => {
                tracing::debug!(loader = %self.id, %name, "unloaded");
                Ok(bytes)
            }
            Err(StoreError::NotFound(_)) => Err(SdkError::NotLoaded(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Every artifact held by this loader's store.
    pub fn loaded_resources(&self) -> BTreeMap<String, Bytes> {
        self.store.snapshot()
    }

    /// Symbolic names of definitions resolved through the local resolver.
    pub fn loaded_definitions(&self) -> Vec<String> {
        self.local.cached()
    }

    // -- Accessors -----------------------------------------------------------

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn chain(&self) -> &Arc<ResolverChain> {
        &self.chain
    }

    pub fn naming(&self) -> &DefinitionNaming {
        self.chain.naming()
    }

    pub fn local(&self) -> &Arc<LocalResolver> {
        &self.local
    }

    pub fn system(&self) -> &Arc<HostResolver> {
        &self.system
    }

    pub fn parent(&self) -> &Arc<HostResolver> {
        &self.parent
    }

    pub fn current(&self) -> &Arc<HostResolver> {
        &self.current
    }

    pub fn thread(&self) -> &Arc<HostResolver> {
        &self.thread
    }

    pub fn boot(&self) -> Option<Arc<BootDelegationResolver>> {
        self.chain.override_resolver()
    }

    /// Register an additional resolver with this loader's chain.
    pub fn add_resolver(&self, resolver: Arc<dyn Resolver>) {
        tracing::debug!(loader = %self.id, resolver = resolver.name(), "adding resolver");
        self.chain.add(resolver);
    }

    /// This loader's chain as a resolver another loader can consult.
    pub fn delegate(&self) -> Arc<DelegateResolver> {
        Arc::new(DelegateResolver::new(
            Arc::clone(&self.chain),
            self.config.delegate.into(),
        ))
    }
}

impl std::fmt::Debug for ArtifactLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactLoader")
            .field("id", &self.id)
            .field("artifacts", &self.store.names().len())
            .field("chain", &self.chain)
            .finish()
    }
}

fn settings_for(config: &ChainConfig, name: &str) -> ResolverSettings {
    config
        .resolver(name)
        .copied()
        .map(ResolverSettings::from)
        .unwrap_or_else(|| ResolverSettings::new(true, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use ark_archive::{ArchiveWriter, Compression};
    use ark_resolve::{ExecutionContext, ResolveError, ResolveResult};
    use ark_store::CollisionPolicy;
    use ark_types::ResourceKind;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ArchiveWriter::new(Compression::Gzip);
        for (name, body) in entries {
            writer.add(*name, body.as_bytes());
        }
        writer.finish_to_bytes().unwrap()
    }

    fn loader() -> ArtifactLoader {
        ArtifactLoader::new(&ArkConfig::default()).unwrap()
    }

    /// Host answering a fixed set of paths.
    struct MapHost(Vec<(&'static str, &'static str)>);

    impl HostRuntime for MapHost {
        fn fetch(&self, path: &str) -> ResolveResult<Option<Bytes>> {
            Ok(self
                .0
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(_, body)| Bytes::from_static(body.as_bytes())))
        }

        fn locate(&self, path: &str) -> ResolveResult<Option<Locator>> {
            Ok(self
                .0
                .iter()
                .any(|(p, _)| *p == path)
                .then(|| Locator::new("host:", path)))
        }
    }

    // -----------------------------------------------------------------------
    // Default resolver set
    // -----------------------------------------------------------------------

    #[test]
    fn default_resolver_order() {
        let loader = loader();
        let names: Vec<String> = loader
            .chain()
            .resolvers()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, ["local", "current", "parent", "thread", "system"]);
        assert!(!loader.thread().is_enabled());
        assert!(loader.boot().is_some());
    }

    #[test]
    fn ingested_definition_resolves_locally() {
        let loader = loader();
        let report = loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(archive(&[
                ("com/acme/Widget.def", "widget"),
                ("conf/app.xml", "<app/>"),
            ])))))
            .unwrap();
        assert_eq!(report.inserted, 2);

        let def = loader.resolve("com.acme.Widget", false).unwrap().unwrap();
        assert_eq!(def.origin, "local");
        assert_eq!(&def.bytes[..], b"widget");

        let mut body = String::new();
        loader
            .resolve_stream("conf/app.xml")
            .unwrap()
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<app/>");
        assert_eq!(loader.loaded_definitions(), vec!["com.acme.Widget"]);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let err = loader().resolve("com.acme.Missing", false).unwrap_err();
        assert!(matches!(
            err,
            SdkError::Resolve(ResolveError::NotFound { kind: ResourceKind::Definition, .. })
        ));
    }

    #[test]
    fn collision_policy_comes_from_config() {
        let mut config = ArkConfig::default();
        config.store.collision = CollisionPolicy::Raise;
        let loader = ArtifactLoader::new(&config).unwrap();
        let bytes = archive(&[("a.txt", "one")]);
        loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(bytes.clone()))))
            .unwrap();
        let err = loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(bytes))))
            .unwrap_err();
        assert!(matches!(err, SdkError::Ingest(_)));
    }

    // -----------------------------------------------------------------------
    // Unloading
    // -----------------------------------------------------------------------

    #[test]
    fn unload_removes_definition_and_resource() {
        let loader = loader();
        loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(archive(&[
                ("com/acme/Widget.def", "widget"),
                ("notes.txt", "n"),
            ])))))
            .unwrap();
        loader.resolve("com.acme.Widget", true).unwrap();

        assert_eq!(&loader.unload("com.acme.Widget").unwrap()[..], b"widget");
        assert!(loader.loaded_definitions().is_empty());
        assert!(loader.resolve("com.acme.Widget", false).is_err());

        assert_eq!(&loader.unload("notes.txt").unwrap()[..], b"n");
        assert!(loader.loaded_resources().is_empty());
    }

    #[test]
    fn unload_of_foreign_name_fails() {
        let err = loader().unload("com.other.Thing").unwrap_err();
        assert!(matches!(err, SdkError::NotLoaded(ref n) if n == "com.other.Thing"));
        assert!(err.to_string().contains("does not belong"));
    }

    // -----------------------------------------------------------------------
    // Hosts and delegation
    // -----------------------------------------------------------------------

    #[test]
    fn system_host_searches_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("com/acme")).unwrap();
        std::fs::write(dir.path().join("com/acme/Gadget.def"), "gadget").unwrap();

        let mut config = ArkConfig::default();
        config.search_path = vec![dir.path().to_path_buf()];
        let loader = ArtifactLoader::new(&config).unwrap();
        let def = loader.resolve("com.acme.Gadget", false).unwrap().unwrap();
        assert_eq!(def.origin, "system");
        assert!(loader.resolve_locator("com/acme/Gadget.def").unwrap().is_some());
    }

    #[test]
    fn boot_delegation_prefers_parent() {
        let mut config = ArkConfig::default();
        config.chain.delegation.enabled = true;
        config.chain.delegation.patterns = vec!["com.acme.*".into()];
        let hosts = LoaderHosts {
            parent: Arc::new(MapHost(vec![("com/acme/Widget.def", "from parent")])),
            ..LoaderHosts::default()
        };
        let loader = ArtifactLoader::with_hosts(&config, hosts, None).unwrap();
        loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(archive(&[(
                "com/acme/Widget.def",
                "from archive",
            )])))))
            .unwrap();

        let def = loader.resolve("com.acme.Widget", false).unwrap().unwrap();
        assert_eq!(&def.bytes[..], b"from parent");
    }

    #[test]
    fn thread_resolver_uses_entered_host() {
        let mut config = ArkConfig::default();
        config.chain.thread.enabled = true;
        let loader = ArtifactLoader::new(&config).unwrap();
        assert!(loader.resolve("app.Main", false).is_err());

        let _guard = ExecutionContext::enter(Arc::new(MapHost(vec![("app/Main.def", "main")])));
        let def = loader.resolve("app.Main", false).unwrap().unwrap();
        assert_eq!(def.origin, "thread");
    }

    #[test]
    fn delegate_chains_two_loaders() {
        let upstream = loader();
        upstream
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(archive(&[(
                "lib/Util.def",
                "util",
            )])))))
            .unwrap();
        let downstream = loader();
        downstream.add_resolver(upstream.delegate());

        let def = downstream.resolve("lib.Util", false).unwrap().unwrap();
        assert_eq!(&def.bytes[..], b"util");
        assert!(downstream.resolve("lib.Missing", false).is_err());
    }

    #[test]
    fn linker_runs_on_eager_resolution() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Counting(AtomicUsize);
        impl Linker for Counting {
            fn link(&self, _definition: &Definition) -> ResolveResult<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let linker = Arc::new(Counting::default());
        let loader = ArtifactLoader::with_hosts(
            &ArkConfig::default(),
            LoaderHosts::default(),
            Some(linker.clone() as Arc<dyn Linker>),
        )
        .unwrap();
        loader
            .add(ArchiveSource::Stream(Box::new(std::io::Cursor::new(archive(&[(
                "a/B.def", "b",
            )])))))
            .unwrap();
        loader.resolve("a.B", false).unwrap();
        loader.resolve("a.B", true).unwrap();
        loader.resolve("a.B", true).unwrap();
        assert_eq!(linker.0.load(Ordering::SeqCst), 1);
    }
}
