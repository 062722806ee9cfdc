//! Hashing and secret-generation ports.
//!
//! Defined in haven-core so `AuthService` can hash passwords and tokens
//! without coupling to a specific algorithm. The argon2, SHA-256 and OS RNG
//! adapters live in haven-infra.

/// Slow, salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing string (e.g. a PHC string).
    fn hash(&self, password: &str) -> Result<String, String>;

    /// Check a password against a hash produced by [`PasswordHasher::hash`].
    ///
    /// A malformed stored hash verifies as `false`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Fast digest used for bearer tokens.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}

/// Source of fresh bearer tokens.
pub trait TokenGenerator: Send + Sync {
    /// Produce a new random token in its plaintext form.
    fn generate_token(&self) -> String;
}
