use std::collections::BTreeMap;

use ark_types::Locator;
use bytes::Bytes;

use crate::error::StoreResult;

/// Name-keyed artifact store.
///
/// All implementations must satisfy these invariants:
/// - Payloads are immutable once written; `put` never overwrites.
/// - Names are normalized before use; blank names are rejected.
/// - Concurrent reads are always safe; mutation is serialized internally.
pub trait ArtifactStore: Send + Sync {
    /// Store a payload under `name`.
    ///
    /// Returns `Ok(true)` if the payload was inserted, `Ok(false)` if the name
    /// already existed and the collision policy skipped the write. Returns
    /// `Err(StoreError::Collision)` if the policy raises on collisions.
    fn put(&self, name: &str, bytes: Bytes) -> StoreResult<bool>;

    /// Read a payload by name. Returns `Ok(None)` if absent.
    fn get(&self, name: &str) -> StoreResult<Option<Bytes>>;

    /// Build a locator for `name` against the store's base locator.
    ///
    /// Fails with `NoBaseLocator` if no base is known; returns `Ok(None)` if
    /// the name is absent.
    fn locate(&self, name: &str) -> StoreResult<Option<Locator>>;

    /// Remove an artifact and return its payload. Fails with `NotFound`.
    fn remove(&self, name: &str) -> StoreResult<Bytes>;

    /// Check whether an artifact exists.
    fn contains(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Sorted list of all stored names.
    fn names(&self) -> Vec<String>;

    /// Read-only copy of every artifact, keyed by name.
    fn snapshot(&self) -> BTreeMap<String, Bytes>;

    /// Set (or clear) the base locator used by [`ArtifactStore::locate`].
    fn set_base_locator(&self, base: Option<String>);

    /// The current base locator, if any.
    fn base_locator(&self) -> Option<String>;
}
