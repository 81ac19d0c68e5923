//! Store configuration.
//!
//! Options can be built in code or loaded from a TOML file such as:
//!
//! ```toml
//! base_dir = "/var/lib/engine/image/distribution"
//! namespace_mode = 0o750
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Directory holding one subdirectory per namespace.
    pub base_dir: PathBuf,
    /// Mode for the base directory when it is created.
    #[serde(default = "StoreOptions::default_base_mode")]
    pub base_mode: u32,
    /// Mode for namespace directories when they are created.
    #[serde(default = "StoreOptions::default_namespace_mode")]
    pub namespace_mode: u32,
    /// Mode for value files.
    #[serde(default = "StoreOptions::default_file_mode")]
    pub file_mode: u32,
    /// Hold an exclusive lock on the base directory while the store is open.
    #[serde(default = "StoreOptions::default_exclusive")]
    pub exclusive: bool,
}

impl StoreOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_mode: Self::default_base_mode(),
            namespace_mode: Self::default_namespace_mode(),
            file_mode: Self::default_file_mode(),
            exclusive: Self::default_exclusive(),
        }
    }

    const fn default_base_mode() -> u32 {
        0o700
    }

    const fn default_namespace_mode() -> u32 {
        0o755
    }

    const fn default_file_mode() -> u32 {
        0o644
    }

    const fn default_exclusive() -> bool {
        true
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(StoreError::io(path))?;
        Self::from_toml_str(&content).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}
