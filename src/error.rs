use std::path::PathBuf;

use crate::rootfs::{Platform, Scheme};

/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored under the key in that namespace.
    #[error("no value for key '{key}' in namespace '{namespace}'")]
    NotFound { namespace: String, key: String },

    /// A namespace or key that cannot be mapped onto the backing medium.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Another store instance already owns the base directory.
    #[error("metadata store at {} is locked by another instance", path.display())]
    Locked { path: PathBuf },

    /// I/O failure at the filesystem level.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by an embedded database backend.
    #[error("backend error: {0}")]
    Backend(String),

    /// A previous holder of the store lock panicked.
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(namespace: &str, key: &str) -> Self {
        Self::NotFound {
            namespace: namespace.to_owned(),
            key: key.to_owned(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from root filesystem descriptors.
#[derive(Debug, thiserror::Error)]
pub enum RootFsError {
    /// The layering scheme cannot be reconstructed on this platform.
    #[error("layer type '{scheme}' is unsupported on {platform}")]
    UnsupportedLayering { scheme: Scheme, platform: Platform },

    #[error("invalid rootfs JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from parsing a content digest.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest '{0}' has no algorithm prefix")]
    MissingAlgorithm(String),

    #[error("unsupported digest algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("digest '{0}' is not 64 lowercase hex characters")]
    InvalidHex(String),
}
