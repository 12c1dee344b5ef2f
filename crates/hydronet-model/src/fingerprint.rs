//! Content fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 digest of a materialized asset
//! set. Version tags ([`crate::StateId`]) drive staleness checks; fingerprints
//! are for diagnostics and tests that compare document contents.

use crate::asset::AssetState;
use crate::id::AssetId;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content digest (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest an asset set
    ///
    /// Order-independent: assets are sorted by id before hashing.
    ///
    /// # Errors
    /// Returns error if an asset state fails to serialize
    pub fn of_assets<'a, I>(assets: I) -> Result<Self, FingerprintError>
    where
        I: IntoIterator<Item = (&'a AssetId, &'a AssetState)>,
    {
        let mut sorted: Vec<_> = assets.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = blake3::Hasher::new();
        for (id, state) in sorted {
            hasher.update(id.as_str().as_bytes());
            hasher.update(&[0]);
            hasher.update(&serde_json::to_vec(state)?);
            hasher.update(&[0]);
        }
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| FingerprintError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors computing or parsing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Wrong digest length
    #[error("invalid fingerprint length: expected 32, got {0}")]
    InvalidLength(usize),

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
