use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Algorithm prefix used for every digest this crate produces.
pub const SHA256_PREFIX: &str = "sha256:";

/// Hashes the concatenation of `parts` with SHA256.
///
/// The order of inputs matters: `sha256_parts(&[a, b]) != sha256_parts(&[b, a])`
/// unless the concatenations happen to be equal.
pub fn sha256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();

    let mut hash_array = [0u8; 32];
    hash_array.copy_from_slice(result.as_slice());
    hash_array
}

/// Renders a SHA256 hash in `sha256:<hex>` form.
pub fn format_sha256(hash: &[u8; 32]) -> String {
    format!("{SHA256_PREFIX}{}", hex::encode(hash))
}

/// Computes the `sha256:<hex>` digest of `data`.
pub fn digest_from_bytes(data: &[u8]) -> String {
    format_sha256(&sha256_parts(&[data]))
}

/// Checks for exactly 64 lowercase hex characters.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f'))
}

/// Flush a directory entry table to disk, so a preceding rename survives a crash.
///
/// Some filesystems refuse to fsync directories; that is logged and ignored.
pub fn fsync_dir(dir: &Path) -> io::Result<()> {
    tracing::trace!("Running fsync() on {}", dir.display());
    let handle = std::fs::File::open(dir)?;
    if let Err(e) = rustix::fs::fsync(&handle) {
        tracing::debug!("Failed to sync {}: {}", dir.display(), e);
    }
    Ok(())
}
