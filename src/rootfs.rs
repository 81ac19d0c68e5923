//! Root filesystem descriptor for an image.
//!
//! A [`RootFs`] is an ordered stack of layer diff ids, bottom layer first,
//! tagged with the [`Scheme`] that produced it. Its identity is the
//! [`ChainId`] derived from that stack.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RootFsError;
use crate::layer::{ChainId, DiffId, create_chain_id};

/// Layering scheme tag, serialized as the raw `type` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scheme {
    /// A flat stack of layers.
    #[default]
    Layers,
    /// Older Windows format that stacked layers on a base layer.
    /// Images in this format can still be loaded but not used.
    LayersWithBase,
    /// Any other tag, kept as-is.
    Other(String),
}

impl Scheme {
    const LAYERS: &'static str = "layers";
    const LAYERS_WITH_BASE: &'static str = "layers+base";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Layers => Self::LAYERS,
            Self::LayersWithBase => Self::LAYERS_WITH_BASE,
            Self::Other(tag) => tag,
        }
    }

    /// Whether a chain id computed under this scheme is meaningful on `platform`.
    pub const fn is_supported_on(&self, platform: Platform) -> bool {
        !matches!((self, platform), (Self::LayersWithBase, Platform::Windows))
    }
}

impl From<String> for Scheme {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            Self::LAYERS => Self::Layers,
            Self::LAYERS_WITH_BASE => Self::LayersWithBase,
            _ => Self::Other(tag),
        }
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family that layer data is materialized on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Windows,
    Other,
}

impl Platform {
    /// The platform this crate was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
            Self::Other => write!(f, "this platform"),
        }
    }
}

/// Describes an image's root filesystem as a stack of layers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RootFs {
    #[serde(rename = "type")]
    scheme: Scheme,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    diff_ids: Vec<DiffId>,
}

impl RootFs {
    /// An empty flat layer stack.
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_scheme(scheme: Scheme) -> Self {
        Self {
            scheme,
            diff_ids: Vec::new(),
        }
    }

    pub const fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn diff_ids(&self) -> &[DiffId] {
        &self.diff_ids
    }

    pub fn len(&self) -> usize {
        self.diff_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diff_ids.is_empty()
    }

    /// Stacks a new layer on top. The diff id is not validated.
    pub fn append(&mut self, diff_id: DiffId) {
        self.diff_ids.push(diff_id);
    }

    pub fn check_supported(&self, platform: Platform) -> Result<(), RootFsError> {
        if self.scheme.is_supported_on(platform) {
            Ok(())
        } else {
            Err(RootFsError::UnsupportedLayering {
                scheme: self.scheme.clone(),
                platform,
            })
        }
    }

    /// Chain id of the top layer on the current platform.
    ///
    /// `None` means either an empty stack or a scheme that cannot be used
    /// here; callers should treat the latter as an unusable image.
    ///
    /// The stores in this crate are Unix-only, so on any build of it the
    /// legacy-scheme guard never fires here. It is only reachable through
    /// [`RootFs::chain_id_on`] with [`Platform::Windows`].
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id_on(Platform::current())
    }

    pub fn chain_id_on(&self, platform: Platform) -> Option<ChainId> {
        if let Err(e) = self.check_supported(platform) {
            let diff_ids: Vec<&str> = self.diff_ids.iter().map(DiffId::as_str).collect();
            tracing::warn!(?diff_ids, "{e}");
            return None;
        }
        create_chain_id(&self.diff_ids)
    }

    pub fn to_json(&self) -> Result<String, RootFsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RootFsError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::digest_from_bytes;

    fn diff(data: &str) -> DiffId {
        DiffId::new(digest_from_bytes(data.as_bytes()))
    }

    fn rootfs_of(layers: &[&str]) -> RootFs {
        let mut rootfs = RootFs::new();
        for layer in layers {
            rootfs.append(diff(layer));
        }
        rootfs
    }

    #[test]
    fn new_is_empty_flat_stack() {
        let rootfs = RootFs::new();
        assert_eq!(rootfs.scheme(), &Scheme::Layers);
        assert!(rootfs.is_empty());
        assert_eq!(rootfs.chain_id(), None);
    }

    #[test]
    fn append_preserves_order() {
        let rootfs = rootfs_of(&["a", "b", "c"]);
        assert_eq!(rootfs.len(), 3);
        assert_eq!(rootfs.diff_ids(), &[diff("a"), diff("b"), diff("c")]);
    }

    #[test]
    fn chain_id_is_stable() {
        let rootfs = rootfs_of(&["a", "b"]);
        assert_eq!(rootfs.chain_id(), rootfs.chain_id());
        assert!(rootfs.chain_id().is_some());
    }

    #[test]
    fn chain_id_depends_on_order() {
        assert_ne!(
            rootfs_of(&["a", "b"]).chain_id(),
            rootfs_of(&["b", "a"]).chain_id()
        );
    }

    #[test]
    fn clone_is_independent() {
        let original = rootfs_of(&["a", "b"]);
        let before = original.chain_id();

        let mut clone = original.clone();
        assert_eq!(clone, original);
        clone.append(diff("x"));

        assert_eq!(original.chain_id(), before);
        assert_eq!(original.len(), 2);
        assert_ne!(clone.chain_id(), original.chain_id());
    }

    #[test]
    fn clone_of_empty_is_independent() {
        let original = RootFs::new();
        let mut clone = original.clone();
        clone.append(diff("x"));
        assert!(original.is_empty());
        assert_eq!(original.chain_id(), None);
        assert_eq!(clone.chain_id().unwrap().as_str(), diff("x").as_str());
    }

    #[test]
    fn legacy_scheme_yields_no_chain_id_on_windows() {
        let mut rootfs = RootFs::with_scheme(Scheme::LayersWithBase);
        rootfs.append(diff("a"));
        rootfs.append(diff("b"));

        assert_eq!(rootfs.chain_id_on(Platform::Windows), None);
        assert!(matches!(
            rootfs.check_supported(Platform::Windows),
            Err(RootFsError::UnsupportedLayering {
                scheme: Scheme::LayersWithBase,
                platform: Platform::Windows,
            })
        ));
    }

    #[test]
    fn legacy_scheme_is_computed_elsewhere() {
        let mut legacy = RootFs::with_scheme(Scheme::LayersWithBase);
        legacy.append(diff("a"));
        legacy.append(diff("b"));

        assert!(legacy.check_supported(Platform::Linux).is_ok());
        assert_eq!(
            legacy.chain_id_on(Platform::Linux),
            rootfs_of(&["a", "b"]).chain_id_on(Platform::Linux)
        );
    }

    #[cfg(unix)]
    #[test]
    fn legacy_scheme_is_computed_on_the_build_platform() {
        assert_ne!(Platform::current(), Platform::Windows);

        let mut legacy = RootFs::with_scheme(Scheme::LayersWithBase);
        legacy.append(diff("a"));
        assert!(legacy.chain_id().is_some());
        assert_eq!(legacy.chain_id(), legacy.chain_id_on(Platform::Linux));
    }

    #[test]
    fn json_matches_image_config_layout() {
        let rootfs = rootfs_of(&["a"]);
        let json = rootfs.to_json().unwrap();
        assert_eq!(
            json,
            format!(r#"{{"type":"layers","diff_ids":["{}"]}}"#, diff("a"))
        );
        assert_eq!(RootFs::from_json(&json).unwrap(), rootfs);

        assert_eq!(RootFs::new().to_json().unwrap(), r#"{"type":"layers"}"#);
    }

    #[test]
    fn json_keeps_unknown_scheme() {
        let rootfs = RootFs::from_json(r#"{"type":"snapshots","diff_ids":[]}"#).unwrap();
        assert_eq!(rootfs.scheme(), &Scheme::Other("snapshots".to_owned()));
        assert_eq!(rootfs.to_json().unwrap(), r#"{"type":"snapshots"}"#);

        let legacy = RootFs::from_json(r#"{"type":"layers+base"}"#).unwrap();
        assert_eq!(legacy.scheme(), &Scheme::LayersWithBase);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            RootFs::from_json("{\"diff_ids\": 5}"),
            Err(RootFsError::Json(_))
        ));
    }
}
