use rustix::fs::{FlockOperation, flock};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Exclusive advisory lock on a store's base directory.
///
/// Held through an open `flock`ed file at `<base>/.lock` and released on
/// drop. `flock` locks belong to the open file description, so two stores
/// in the same process conflict just like two processes do.
#[derive(Debug)]
pub struct DirLock {
    path: PathBuf,
    _file: File,
}

impl DirLock {
    const LOCK_FILE: &'static str = ".lock";

    /// Takes the lock without blocking.
    pub fn acquire(base: &Path) -> StoreResult<Self> {
        let path = base.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(StoreError::io(&path))?;

        match flock(&file, FlockOperation::NonBlockingLockExclusive) {
            Ok(()) => {
                tracing::trace!("Locked metadata store at {}", base.display());
                Ok(Self { path, _file: file })
            }
            Err(rustix::io::Errno::WOULDBLOCK) => Err(StoreError::Locked {
                path: base.to_path_buf(),
            }),
            Err(e) => Err(StoreError::Io {
                path,
                source: e.into(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
