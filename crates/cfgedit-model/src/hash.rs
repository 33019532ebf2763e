//! Entity fingerprints
//!
//! [`ContentHash`] is the digest of an entity's canonical JSON form. Its hex
//! rendering is the freshness token clients echo back with an edit.

use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt::{self, Display, Formatter};

/// Digest algorithm used to fingerprint entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// Blake3 (default)
    #[default]
    Blake3,

    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Digest raw bytes with this algorithm
    #[must_use]
    pub fn digest(self, data: &[u8]) -> ContentHash {
        match self {
            Self::Blake3 => ContentHash(*blake3::hash(data).as_bytes()),
            Self::Sha256 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&sha2::Sha256::digest(data));
                ContentHash(out)
            }
        }
    }
}

/// 32-byte digest, displayed as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Fingerprint a value through its JSON encoding
    ///
    /// Fields marked `#[serde(skip)]` do not contribute.
    ///
    /// # Errors
    /// Returns error if the value cannot be encoded as JSON
    pub fn compute_serializable<T>(value: &T, algorithm: HashAlgorithm) -> Result<Self, HashError>
    where
        T: Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(algorithm.digest(&json))
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Errors raised while fingerprinting an entity
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The entity could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithms_disagree() {
        let blake = HashAlgorithm::Blake3.digest(b"template");
        let sha = HashAlgorithm::Sha256.digest(b"template");
        assert_ne!(blake, sha);
        assert_eq!(blake, HashAlgorithm::Blake3.digest(b"template"));
    }

    #[test]
    fn sha256_known_vector() {
        let hash = HashAlgorithm::Sha256.digest(b"abc");
        assert_eq!(
            hash.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn compute_serializable_tracks_content() {
        let a = ContentHash::compute_serializable(&["a", "b"], HashAlgorithm::Blake3).unwrap();
        let b = ContentHash::compute_serializable(&["a", "b"], HashAlgorithm::Blake3).unwrap();
        let c = ContentHash::compute_serializable(&["b", "a"], HashAlgorithm::Blake3).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 64);
    }

    #[test]
    fn unencodable_value_is_an_error() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(vec![1u8], "non-string key");
        let err = ContentHash::compute_serializable(&map, HashAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, HashError::Serialization(_)));
    }

    #[test]
    fn algorithm_serde_names() {
        let algo: HashAlgorithm = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(algo, HashAlgorithm::Sha256);
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Blake3);
    }
}
