//! SHA-256 hashing of bearer tokens.
//!
//! Only this digest of a login token is stored, so a leaked database does
//! not leak usable tokens.

use sha2::{Digest, Sha256};

use haven_core::auth::hash::ContentHasher;

/// SHA-256 implementation of `ContentHasher`, lowercase hex output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        format!("{:x}", digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash_known_value() {
        let hash = Sha256ContentHasher::new().compute_hash("");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hash_is_lowercase_hex() {
        let hash = Sha256ContentHasher::new().compute_hash("hvn_token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sha256_hash_differs_per_token() {
        let hasher = Sha256ContentHasher::new();
        assert_ne!(hasher.compute_hash("hvn_a"), hasher.compute_hash("hvn_b"));
    }
}
