//! Namespaced metadata store.
//!
//! Maps `(namespace, key)` pairs to opaque byte values, used to associate
//! external identifiers (registry v1 ids, content digests) with internal
//! layer and image ids. Namespaces partition the key space: the same key in
//! two namespaces names two unrelated values.
//!
//! Three backends implement [`MetadataStore`]:
//!
//! - [`FsMetadataStore`] -- one file per key under `<base>/<namespace>/<key>`
//! - [`SledMetadataStore`] -- one sled tree per namespace
//! - [`InMemoryMetadataStore`] -- a `HashMap`, for embedding and tests
//!
//! Every backend serializes writers and admits concurrent readers through a
//! single lock per instance.
mod db;
mod fs;
mod lock;
mod memory;

pub use db::SledMetadataStore;
pub use fs::FsMetadataStore;
pub use lock::DirLock;
pub use memory::InMemoryMetadataStore;

use crate::error::{StoreError, StoreResult};

/// Key/value store partitioned by namespace.
pub trait MetadataStore: Send + Sync {
    /// Reads the value last written under `key` in `namespace`.
    ///
    /// Fails with [`StoreError::NotFound`] if it was never written or has
    /// been deleted.
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>>;

    /// Replaces the value under `key` in `namespace`.
    ///
    /// Readers observe either the previous value or the new one, never a
    /// mixture.
    fn set(&self, namespace: &str, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Removes the value under `key` in `namespace`.
    ///
    /// Fails with [`StoreError::NotFound`] if there is nothing to remove.
    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()>;

    fn exists(&self, namespace: &str, key: &str) -> StoreResult<bool> {
        match self.get(namespace, key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Checks that a namespace or key maps onto a single path component.
///
/// Names starting with `.` are reserved for the lock file and for
/// in-flight temporary files.
pub fn validate_name(name: &str) -> StoreResult<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.starts_with('.') {
        "must not start with '.'"
    } else if name.contains('/') {
        "must not contain '/'"
    } else if name.contains('\0') {
        "must not contain NUL"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

fn validate(namespace: &str, key: &str) -> StoreResult<()> {
    validate_name(namespace)?;
    validate_name(key)
}
