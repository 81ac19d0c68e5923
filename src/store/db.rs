use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::{DirLock, MetadataStore, validate};
use crate::error::{StoreError, StoreResult};

/// Metadata store backed by an embedded sled database.
///
/// Each namespace is a separate sled tree inside `<base>/metadata.db`.
/// Writes are flushed before returning.
pub struct SledMetadataStore {
    lock: RwLock<()>,
    base_path: PathBuf,
    db: sled::Db,
    _dir_lock: DirLock,
}

impl SledMetadataStore {
    const DB_DIR: &'static str = "metadata.db";
    const DEFAULT_TREE: &'static [u8] = b"__sled__default";

    pub fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(StoreError::io(&base_path))?;
        let dir_lock = DirLock::acquire(&base_path)?;

        let db = sled::open(base_path.join(Self::DB_DIR))?;
        tracing::debug!("Opened sled metadata store at {}", base_path.display());

        Ok(Self {
            lock: RwLock::new(()),
            base_path,
            db,
            _dir_lock: dir_lock,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Names of the namespaces that have been written to.
    pub fn namespaces(&self) -> StoreResult<Vec<String>> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        Ok(self
            .db
            .tree_names()
            .into_iter()
            .filter(|name| &name[..] != Self::DEFAULT_TREE)
            .map(|name| String::from_utf8_lossy(&name).into_owned())
            .collect())
    }

    /// Opens the tree for `namespace`, creating it. Only writers call this.
    fn tree(&self, namespace: &str) -> StoreResult<sled::Tree> {
        Ok(self.db.open_tree(namespace.as_bytes())?)
    }

    /// Opens the tree for `namespace` only if it was created by an earlier write.
    fn existing_tree(&self, namespace: &str) -> StoreResult<Option<sled::Tree>> {
        let exists = self
            .db
            .tree_names()
            .iter()
            .any(|name| &name[..] == namespace.as_bytes());
        if exists { self.tree(namespace).map(Some) } else { Ok(None) }
    }
}

impl MetadataStore for SledMetadataStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>> {
        validate(namespace, key)?;
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;

        let Some(tree) = self.existing_tree(namespace)? else {
            return Err(StoreError::not_found(namespace, key));
        };
        tree.get(key.as_bytes())?
            .map(|value| value.to_vec())
            .ok_or_else(|| StoreError::not_found(namespace, key))
    }

    fn set(&self, namespace: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        validate(namespace, key)?;
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        let tree = self.tree(namespace)?;
        tree.insert(key.as_bytes(), value)?;
        tree.flush()?;
        tracing::trace!(namespace, key, size = value.len(), "Stored value");
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        validate(namespace, key)?;
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        let Some(tree) = self.existing_tree(namespace)? else {
            return Err(StoreError::not_found(namespace, key));
        };
        if tree.remove(key.as_bytes())?.is_none() {
            return Err(StoreError::not_found(namespace, key));
        }
        tree.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SledMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledMetadataStore")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}
