use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use ark_types::{normalize_name, Locator};
use bytes::Bytes;

use crate::config::{CollisionPolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::traits::ArtifactStore;

/// In-memory, HashMap-based artifact store.
///
/// All payloads are held behind a `RwLock`. Payloads are `Bytes`, so reads
/// hand out cheap reference-counted views instead of copies.
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Bytes>>,
    base: RwLock<Option<String>>,
    policy: RwLock<CollisionPolicy>,
}

impl InMemoryArtifactStore {
    /// Create a new empty store with the default (skip) collision policy.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty store from configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            artifacts: RwLock::new(HashMap::new()),
            base: RwLock::new(None),
            policy: RwLock::new(config.collision),
        }
    }

    /// The active collision policy.
    pub fn collision_policy(&self) -> CollisionPolicy {
        *self.policy.read().expect("lock poisoned")
    }

    /// Change the collision policy for subsequent writes.
    pub fn set_collision_policy(&self, policy: CollisionPolicy) {
        *self.policy.write().expect("lock poisoned") = policy;
    }

    /// Number of artifacts currently stored.
    pub fn len(&self) -> usize {
        self.artifacts.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all artifacts.
    pub fn total_bytes(&self) -> u64 {
        self.artifacts
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all artifacts. The base locator is kept.
    pub fn clear(&self) {
        self.artifacts.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put(&self, name: &str, bytes: Bytes) -> StoreResult<bool> {
        let name = normalize_name(name)?;
        let policy = self.collision_policy();
        let mut map = self.artifacts.write().expect("lock poisoned");

        if let Some(existing) = map.get(&name) {
            return match policy {
                CollisionPolicy::Raise => Err(StoreError::Collision(name)),
                CollisionPolicy::Skip => {
                    tracing::trace!(
                        artifact = %name,
                        identical = (*existing == bytes),
                        "artifact already loaded; ignoring entry"
                    );
                    Ok(false)
                }
            };
        }

        tracing::trace!(artifact = %name, size = bytes.len(), "storing artifact");
        map.insert(name, bytes);
        Ok(true)
    }

    fn get(&self, name: &str) -> StoreResult<Option<Bytes>> {
        let name = normalize_name(name)?;
        let map = self.artifacts.read().expect("lock poisoned");
        Ok(map.get(&name).cloned())
    }

    fn locate(&self, name: &str) -> StoreResult<Option<Locator>> {
        let name = normalize_name(name)?;
        let base = self
            .base_locator()
            .ok_or_else(|| StoreError::NoBaseLocator(name.clone()))?;
        let map = self.artifacts.read().expect("lock poisoned");
        Ok(map.contains_key(&name).then(|| Locator::new(base, name)))
    }

    fn remove(&self, name: &str) -> StoreResult<Bytes> {
        let name = normalize_name(name)?;
        let mut map = self.artifacts.write().expect("lock poisoned");
        match map.remove(&name) {
            Some(bytes) => {
                tracing::trace!(artifact = %name, "removed artifact");
                Ok(bytes)
            }
            None => Err(StoreError::NotFound(name)),
        }
    }

    fn contains(&self, name: &str) -> StoreResult<bool> {
        let name = normalize_name(name)?;
        Ok(self
            .artifacts
            .read()
            .expect("lock poisoned")
            .contains_key(&name))
    }

    fn names(&self) -> Vec<String> {
        let map = self.artifacts.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    fn snapshot(&self) -> BTreeMap<String, Bytes> {
        let map = self.artifacts.read().expect("lock poisoned");
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn set_base_locator(&self, base: Option<String>) {
        *self.base.write().expect("lock poisoned") = base;
    }

    fn base_locator(&self) -> Option<String> {
        self.base.read().expect("lock poisoned").clone()
    }
}

impl std::fmt::Debug for InMemoryArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryArtifactStore")
            .field("artifact_count", &self.len())
            .field("base", &self.base_locator())
            .field("policy", &self.collision_policy())
            .finish()
    }
}
