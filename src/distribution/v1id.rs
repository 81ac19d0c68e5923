use std::path::Path;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::layer::DiffId;
use crate::store::MetadataStore;
use crate::util::is_sha256_hex;

/// Maps legacy registry v1 layer ids to local layer diff ids.
///
/// v1 ids are only unique per registry, so entries are keyed by
/// `"<registry>,<v1 id>"` in the `v1id` namespace.
#[derive(Clone)]
pub struct V1IdService {
    store: Arc<dyn MetadataStore>,
}

impl V1IdService {
    const NAMESPACE: &'static str = "v1id";

    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    fn key(v1_id: &str, registry: &str) -> StoreResult<String> {
        if !is_sha256_hex(v1_id) {
            return Err(StoreError::InvalidName {
                name: v1_id.to_owned(),
                reason: "v1 id must be 64 lowercase hex characters",
            });
        }
        Ok(format!("{registry},{v1_id}"))
    }

    /// Finds the diff id recorded for `v1_id` on `registry`.
    pub fn get(&self, v1_id: &str, registry: &str) -> StoreResult<DiffId> {
        let key = Self::key(v1_id, registry)?;
        let value = self.store.get(Self::NAMESPACE, &key)?;
        String::from_utf8(value)
            .map(DiffId::new)
            .map_err(|e| StoreError::Io {
                path: Path::new(Self::NAMESPACE).join(&key),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })
    }

    /// Records that `v1_id` on `registry` refers to the layer `diff_id`.
    pub fn set(&self, v1_id: &str, registry: &str, diff_id: &DiffId) -> StoreResult<()> {
        let key = Self::key(v1_id, registry)?;
        tracing::debug!(v1_id, registry, %diff_id, "Recording v1 id mapping");
        self.store
            .set(Self::NAMESPACE, &key, diff_id.as_str().as_bytes())
    }
}

impl std::fmt::Debug for V1IdService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V1IdService").finish_non_exhaustive()
    }
}
