//! Layer identity.
//!
//! A [`DiffId`] names one layer's changeset on its own. A [`ChainId`] names an
//! ordered stack of layers and is derived from the stack's diff ids with
//! [`create_chain_id`].
mod digest;
pub use digest::*;

use crate::util::{format_sha256, sha256_parts};

/// Computes the chain id for a stack of layers, bottom layer first.
///
/// Returns `None` for an empty stack.
pub fn create_chain_id(diff_ids: &[DiffId]) -> Option<ChainId> {
    create_chain_id_from(None, diff_ids)
}

/// Continues a chain id computation from an existing parent.
///
/// The chain id of a single layer is its diff id. Every following layer
/// hashes `"<parent> <diff id>"` with SHA256. An empty parent is treated as
/// absent, so the next diff id restarts the chain.
pub fn create_chain_id_from(parent: Option<&ChainId>, diff_ids: &[DiffId]) -> Option<ChainId> {
    diff_ids
        .iter()
        .fold(parent.cloned(), |parent, diff_id| match parent {
            Some(parent) if !parent.as_str().is_empty() => Some(parent.child(diff_id)),
            _ => Some(ChainId::from(diff_id)),
        })
        .filter(|chain_id| !chain_id.as_str().is_empty())
}

impl ChainId {
    /// The chain id of `diff_id` stacked on top of `self`.
    pub fn child(&self, diff_id: &DiffId) -> Self {
        let hash = sha256_parts(&[
            self.as_str().as_bytes(),
            b" ",
            diff_id.as_str().as_bytes(),
        ]);
        Self::new(format_sha256(&hash))
    }
}
