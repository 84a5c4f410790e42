use crate::error::{CasketError, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash function used to derive blob fingerprints.
///
/// A store uses a single algorithm for its whole lifetime; the on-disk layout
/// only records the hex digest, so mixing algorithms in one root is not
/// supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl FingerprintAlgorithm {
    /// Length of the lowercase hex digest produced by this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            FingerprintAlgorithm::Md5 => 32,
            FingerprintAlgorithm::Sha256 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FingerprintAlgorithm::Md5 => "md5",
            FingerprintAlgorithm::Sha256 => "sha256",
        }
    }
}

/// Content fingerprint: a fixed-length lowercase hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Validate an externally supplied fingerprint for the given algorithm.
    pub fn parse(algorithm: FingerprintAlgorithm, value: &str) -> Result<Self> {
        if value.len() != algorithm.hex_len() {
            return Err(CasketError::InvalidFingerprint(format!(
                "expected {} hex chars for {}, got {}",
                algorithm.hex_len(),
                algorithm.name(),
                value.len()
            )));
        }

        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(CasketError::InvalidFingerprint(format!(
                "fingerprint must be lowercase hex: {:?}",
                value
            )));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the fingerprint of a payload
pub fn compute_fingerprint(algorithm: FingerprintAlgorithm, payload: &[u8]) -> Fingerprint {
    let digest = match algorithm {
        FingerprintAlgorithm::Md5 => hex::encode(Md5::digest(payload)),
        FingerprintAlgorithm::Sha256 => hex::encode(Sha256::digest(payload)),
    };
    Fingerprint(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_known_vector() {
        let fp = compute_fingerprint(FingerprintAlgorithm::Md5, b"hello");
        assert_eq!(fp.as_str(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_empty_payload() {
        let md5 = compute_fingerprint(FingerprintAlgorithm::Md5, b"");
        assert_eq!(md5.as_str(), "d41d8cd98f00b204e9800998ecf8427e");

        let sha = compute_fingerprint(FingerprintAlgorithm::Sha256, b"");
        assert_eq!(
            sha.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let data = vec![7u8; 4096];
        let first = compute_fingerprint(FingerprintAlgorithm::Sha256, &data);
        let second = compute_fingerprint(FingerprintAlgorithm::Sha256, &data);
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let algo = FingerprintAlgorithm::Md5;
        assert!(Fingerprint::parse(algo, "5d").is_err());
        assert!(Fingerprint::parse(algo, "5D41402ABC4B2A76B9719D911017C592").is_err());
        assert!(Fingerprint::parse(algo, "5d41402abc4b2a76b9719d911017c59/").is_err());
        assert!(Fingerprint::parse(algo, "5d41402abc4b2a76b9719d911017c592").is_ok());
        assert!(
            Fingerprint::parse(FingerprintAlgorithm::Sha256, "5d41402abc4b2a76b9719d911017c592")
                .is_err()
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let fp = compute_fingerprint(FingerprintAlgorithm::Md5, b"hello");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, "\"5d41402abc4b2a76b9719d911017c592\"");
    }
}
