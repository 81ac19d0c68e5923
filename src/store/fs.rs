use std::fs::{DirBuilder, Permissions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::{DirLock, MetadataStore, validate};
use crate::config::StoreOptions;
use crate::error::{StoreError, StoreResult};
use crate::util::fsync_dir;

/// Filesystem-backed metadata store.
///
/// Each value lives in its own file at `<base>/<namespace>/<key>`, holding
/// the raw value bytes. Writes go to a temporary file in the namespace
/// directory which is then renamed over the destination, so a reader never
/// sees a partial value.
#[derive(Debug)]
pub struct FsMetadataStore {
    lock: RwLock<()>,
    options: StoreOptions,
    _dir_lock: Option<DirLock>,
}

impl FsMetadataStore {
    const TEMP_PREFIX: &'static str = ".tmp-";

    /// Opens a store at `base_path` with the default modes.
    pub fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_options(StoreOptions::new(base_path))
    }

    pub fn with_options(options: StoreOptions) -> StoreResult<Self> {
        let base = &options.base_dir;
        tracing::debug!("Opening metadata store at {}", base.display());
        DirBuilder::new()
            .recursive(true)
            .mode(options.base_mode)
            .create(base)
            .map_err(StoreError::io(base))?;

        let dir_lock = if options.exclusive {
            Some(DirLock::acquire(base)?)
        } else {
            None
        };

        Ok(Self {
            lock: RwLock::new(()),
            options,
            _dir_lock: dir_lock,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.options.base_dir
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.options.base_dir.join(namespace)
    }

    fn path(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_path(namespace).join(key)
    }

    fn write_atomic(&self, dir: &Path, path: &Path, value: &[u8]) -> StoreResult<()> {
        let mut temp = tempfile::Builder::new()
            .prefix(Self::TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(StoreError::io(dir))?;

        temp.write_all(value).map_err(StoreError::io(temp.path()))?;
        temp.as_file()
            .set_permissions(Permissions::from_mode(self.options.file_mode))
            .map_err(StoreError::io(temp.path()))?;
        temp.as_file()
            .sync_all()
            .map_err(StoreError::io(temp.path()))?;

        // A failed persist drops the temporary file and leaves the old value in place.
        temp.persist(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        fsync_dir(dir).map_err(StoreError::io(dir))
    }
}

impl MetadataStore for FsMetadataStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>> {
        validate(namespace, key)?;
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;

        let path = self.path(namespace, key);
        tracing::trace!("Reading {}", path.display());
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::not_found(namespace, key),
            _ => StoreError::Io { path, source: e },
        })
    }

    fn set(&self, namespace: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        validate(namespace, key)?;
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        let dir = self.namespace_path(namespace);
        if !dir.is_dir() {
            tracing::debug!("Creating namespace directory {}", dir.display());
            DirBuilder::new()
                .recursive(true)
                .mode(self.options.namespace_mode)
                .create(&dir)
                .map_err(StoreError::io(&dir))?;
        }

        let path = dir.join(key);
        tracing::trace!(size = value.len(), "Writing {}", path.display());
        self.write_atomic(&dir, &path, value)
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        validate(namespace, key)?;
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        let path = self.path(namespace, key);
        tracing::trace!("Removing {}", path.display());
        std::fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::not_found(namespace, key),
            _ => StoreError::Io { path, source: e },
        })
    }
}
