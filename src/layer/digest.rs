use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DigestError;
use crate::util::{SHA256_PREFIX, is_sha256_hex};

/// Content hash of a single layer's filesystem changeset, e.g. `sha256:<hex>`.
///
/// [`DiffId::new`] does not validate; use [`DiffId::parse`] or [`str::parse`]
/// when the input comes from an untrusted source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffId(String);

/// Content hash identifying an ordered stack of layers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl DiffId {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Parses a well-formed `sha256:<64 hex>` digest.
    pub fn parse(s: &str) -> Result<Self, DigestError> {
        validate_digest(s).map(|()| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex portion after the algorithm prefix.
    pub fn hex(&self) -> &str {
        hex_part(&self.0)
    }
}

impl ChainId {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn parse(s: &str) -> Result<Self, DigestError> {
        validate_digest(s).map(|()| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hex(&self) -> &str {
        hex_part(&self.0)
    }
}

fn hex_part(digest: &str) -> &str {
    digest.split_once(':').map_or(digest, |(_, hex)| hex)
}

fn validate_digest(s: &str) -> Result<(), DigestError> {
    let Some((algorithm, hex)) = s.split_once(':') else {
        return Err(DigestError::MissingAlgorithm(s.to_owned()));
    };
    if SHA256_PREFIX.strip_suffix(':') != Some(algorithm) {
        return Err(DigestError::UnsupportedAlgorithm(algorithm.to_owned()));
    }
    if !is_sha256_hex(hex) {
        return Err(DigestError::InvalidHex(s.to_owned()));
    }
    Ok(())
}

impl FromStr for DiffId {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for ChainId {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for DiffId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DiffId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<&DiffId> for ChainId {
    fn from(diff_id: &DiffId) -> Self {
        Self(diff_id.0.clone())
    }
}

impl fmt::Display for DiffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn parse_accepts_sha256() {
        let id: DiffId = format!("sha256:{HEX}").parse().unwrap();
        assert_eq!(id.hex(), HEX);
        assert_eq!(id.to_string(), format!("sha256:{HEX}"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(
            DiffId::parse(HEX),
            Err(DigestError::MissingAlgorithm(HEX.to_owned()))
        );
        assert_eq!(
            ChainId::parse(&format!("md5:{HEX}")),
            Err(DigestError::UnsupportedAlgorithm("md5".to_owned()))
        );
        assert!(matches!(
            DiffId::parse("sha256:abc"),
            Err(DigestError::InvalidHex(_))
        ));
    }

    #[test]
    fn new_does_not_validate() {
        let id = DiffId::new("not a digest");
        assert_eq!(id.as_str(), "not a digest");
        assert_eq!(id.hex(), "not a digest");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DiffId::new(format!("sha256:{HEX}"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"sha256:{HEX}\""));
        let back: DiffId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
