//! Content-addressable layer identity and durable id mappings for a layered
//! image store.
//!
//! - [`rootfs::RootFs`] describes an image's root filesystem as an ordered
//!   stack of layer diff ids and derives the stack's [`layer::ChainId`].
//! - [`store::MetadataStore`] persists small values under `(namespace, key)`
//!   pairs, e.g. registry ids mapped to local layer ids.
pub mod config;
pub mod distribution;
pub mod error;
pub mod layer;
pub mod logging;
pub mod rootfs;
pub mod store;
pub mod util;

pub use config::StoreOptions;
pub use error::{DigestError, RootFsError, StoreError, StoreResult};
pub use layer::{ChainId, DiffId, create_chain_id};
pub use rootfs::{Platform, RootFs, Scheme};
pub use store::{FsMetadataStore, InMemoryMetadataStore, MetadataStore, SledMetadataStore};
